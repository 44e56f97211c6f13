/// Utility functions for handling Telegram MarkdownV2 formatting
///
/// MarkdownV2 requires escaping of special characters to prevent formatting
/// issues; replies interpolate user- and API-provided names, so everything
/// dynamic goes through here.
/// Escapes markdown special characters for MarkdownV2 parsing mode
pub fn escape_markdown(text: &str) -> String {
    text.replace('_', "\\_")
        .replace('*', "\\*")
        .replace('[', "\\[")
        .replace(']', "\\]")
        .replace('(', "\\(")
        .replace(')', "\\)")
        .replace('~', "\\~")
        .replace('`', "\\`")
        .replace('>', "\\>")
        .replace('#', "\\#")
        .replace('+', "\\+")
        .replace('-', "\\-")
        .replace('=', "\\=")
        .replace('|', "\\|")
        .replace('{', "\\{")
        .replace('}', "\\}")
        .replace('.', "\\.")
        .replace('!', "\\!")
}
