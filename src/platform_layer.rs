pub mod app;
pub mod console_input;
pub mod console_renderer;
pub mod error;
pub mod types;

pub use app::ConsolePlatform;
pub use error::Result as PlatformResult;
pub use types::{
    AppEvent, FileDetails, MessageSeverity, PlatformCommand, PlatformEventHandler,
    PreviewRowDescriptor, SettingsEdit, TreeItemId, TreeRowDescriptor,
};
