// Character-level rewrites that need state or look-around

const INLINE_OPEN: &str = r"\(";
const INLINE_CLOSE: &str = r"\)";
const DISPLAY_OPEN: &str = r"\[";
const DISPLAY_CLOSE: &str = r"\]";

/// Replace `$...$` with `\(...\)` and `$$...$$` with `\[...\]`, toggling on each
/// delimiter so open and close markers alternate. Escaped `\$` is left for
/// delimiter cleanup.
pub fn toggle_dollars(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut inline_open = false;
    let mut display_open = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                out.push(c);
                if let Some(&next) = chars.peek() {
                    out.push(next);
                    chars.next();
                }
            }
            '$' if chars.peek() == Some(&'$') => {
                chars.next();
                out.push_str(if display_open { DISPLAY_CLOSE } else { DISPLAY_OPEN });
                display_open = !display_open;
            }
            '$' => {
                out.push_str(if inline_open { INLINE_CLOSE } else { INLINE_OPEN });
                inline_open = !inline_open;
            }
            _ => out.push(c),
        }
    }

    out
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// A `-` or `+` squeezed between two word characters is read as an operator:
/// `n-1` becomes `n minus 1`. Outside math markers a hyphen joining two letters
/// is a compound word (`well-known`) and keeps its shape.
pub fn space_signs(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 16);
    let mut depth = 0usize;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\\' && i + 1 < chars.len() {
            match chars[i + 1] {
                '(' | '[' => depth += 1,
                ')' | ']' => depth = depth.saturating_sub(1),
                _ => {}
            }
            out.push(c);
            out.push(chars[i + 1]);
            i += 2;
            continue;
        }

        let between_words = i > 0 && i + 1 < chars.len() && is_word(chars[i - 1]) && is_word(chars[i + 1]);
        let compound = depth == 0
            && between_words
            && chars[i - 1].is_alphabetic()
            && chars[i + 1].is_alphabetic();

        match c {
            '-' if between_words && !compound => out.push_str(" minus "),
            '+' if between_words => out.push_str(" plus "),
            _ => out.push(c),
        }
        i += 1;
    }

    out
}

fn is_operator(c: char) -> bool {
    matches!(c, '<' | '>' | '=' | '+' | '-')
}

/// Put a space between an alphanumeric and an adjacent operator character.
/// A hyphen joining two letters is a compound word and keeps its shape.
pub fn space_operators(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 16);

    for (i, &c) in chars.iter().enumerate() {
        let prev = if i > 0 { Some(chars[i - 1]) } else { None };
        let next = chars.get(i + 1).copied();

        if !is_operator(c) {
            out.push(c);
            continue;
        }

        let hyphenated = c == '-'
            && prev.map_or(false, char::is_alphabetic)
            && next.map_or(false, char::is_alphabetic);
        if hyphenated {
            out.push(c);
            continue;
        }

        if prev.map_or(false, |p| p.is_ascii_alphanumeric()) {
            out.push(' ');
        }
        out.push(c);
        if next.map_or(false, |n| n.is_ascii_alphanumeric()) {
            out.push(' ');
        }
    }

    out
}
