pub mod assist;
pub mod config;
pub mod editor;
pub mod history;
pub mod input;
pub mod interaction;
pub mod shortcuts;
pub mod store;
pub mod text_edit;
pub mod viewport;

pub use assist::{AssistError, DiagramAssistant};
pub use config::EditorConfig;
pub use editor::Editor;
pub use history::History;
pub use input::{InputEvent, Modifiers};
pub use interaction::{Effect, Effects, Interaction, InteractionError, Mode, Outcome};
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use store::DiagramStore;
pub use text_edit::{EditTarget, TextEditor};
pub use viewport::{Minimap, Viewport};
