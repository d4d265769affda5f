pub mod capture_service;
pub mod credential;
pub mod document_assembler;
pub mod session_manager;

pub use capture_service::CaptureService;
pub use credential::CredentialProvider;
pub use document_assembler::DocumentAssembler;
pub use session_manager::{LoginPrompt, SessionManager, SessionState, TerminalPrompt};
