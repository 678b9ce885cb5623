// Command dictionary - user-editable LaTeX command -> spoken phrase overrides

mod flat;
mod shared;
mod store;

pub use flat::{parse_flat_line, ImportReport};
pub use shared::SharedDictionary;
pub use store::{CommandDictionary, DictionaryError};
