use imaginarium::MirageMode;

use crate::messages::{COLOR_COMMAND, GRAY_COMMAND};

/// Maps command text to the compositor it starts.
///
/// Surrounding whitespace and a single leading `/` are accepted.
pub fn parse_command(text: &str) -> Option<MirageMode> {
    let text = text.trim();
    let text = text.strip_prefix('/').unwrap_or(text);

    match text {
        GRAY_COMMAND => Some(MirageMode::Gray),
        COLOR_COMMAND => Some(MirageMode::Color),
        _ => None,
    }
}
