/// Common Adobe glyph names that are not a single letter or digit.
const GLYPH_NAMES: &[(&str, char)] = &[
    ("space", ' '),
    ("exclam", '!'),
    ("quotedbl", '"'),
    ("numbersign", '#'),
    ("dollar", '$'),
    ("percent", '%'),
    ("ampersand", '&'),
    ("quotesingle", '\''),
    ("parenleft", '('),
    ("parenright", ')'),
    ("asterisk", '*'),
    ("plus", '+'),
    ("comma", ','),
    ("hyphen", '-'),
    ("period", '.'),
    ("slash", '/'),
    ("zero", '0'),
    ("one", '1'),
    ("two", '2'),
    ("three", '3'),
    ("four", '4'),
    ("five", '5'),
    ("six", '6'),
    ("seven", '7'),
    ("eight", '8'),
    ("nine", '9'),
    ("colon", ':'),
    ("semicolon", ';'),
    ("less", '<'),
    ("equal", '='),
    ("greater", '>'),
    ("question", '?'),
    ("at", '@'),
    ("bracketleft", '['),
    ("backslash", '\\'),
    ("bracketright", ']'),
    ("asciicircum", '^'),
    ("underscore", '_'),
    ("grave", '`'),
    ("braceleft", '{'),
    ("bar", '|'),
    ("braceright", '}'),
    ("asciitilde", '~'),
    ("quoteleft", '\u{2018}'),
    ("quoteright", '\u{2019}'),
    ("quotesinglbase", '\u{201a}'),
    ("quotedblleft", '\u{201c}'),
    ("quotedblright", '\u{201d}'),
    ("quotedblbase", '\u{201e}'),
    ("endash", '\u{2013}'),
    ("emdash", '\u{2014}'),
    ("bullet", '\u{2022}'),
    ("ellipsis", '\u{2026}'),
    ("dagger", '\u{2020}'),
    ("daggerdbl", '\u{2021}'),
    ("Euro", '\u{20ac}'),
    ("trademark", '\u{2122}'),
    ("copyright", '\u{a9}'),
    ("registered", '\u{ae}'),
    ("degree", '\u{b0}'),
    ("section", '\u{a7}'),
    ("paragraph", '\u{b6}'),
    ("periodcentered", '\u{b7}'),
    ("minus", '\u{2212}'),
    ("multiply", '\u{d7}'),
    ("divide", '\u{f7}'),
    ("nbspace", '\u{a0}'),
    ("sterling", '\u{a3}'),
    ("yen", '\u{a5}'),
    ("cent", '\u{a2}'),
    ("germandbls", '\u{df}'),
    ("fi", '\u{fb01}'),
    ("fl", '\u{fb02}'),
    ("ff", '\u{fb00}'),
    ("ffi", '\u{fb03}'),
    ("ffl", '\u{fb04}'),
    ("aacute", '\u{e1}'),
    ("agrave", '\u{e0}'),
    ("acircumflex", '\u{e2}'),
    ("adieresis", '\u{e4}'),
    ("aring", '\u{e5}'),
    ("ccedilla", '\u{e7}'),
    ("eacute", '\u{e9}'),
    ("egrave", '\u{e8}'),
    ("ecircumflex", '\u{ea}'),
    ("edieresis", '\u{eb}'),
    ("iacute", '\u{ed}'),
    ("idieresis", '\u{ef}'),
    ("ntilde", '\u{f1}'),
    ("oacute", '\u{f3}'),
    ("odieresis", '\u{f6}'),
    ("oslash", '\u{f8}'),
    ("uacute", '\u{fa}'),
    ("udieresis", '\u{fc}'),
    ("Adieresis", '\u{c4}'),
    ("Aring", '\u{c5}'),
    ("Eacute", '\u{c9}'),
    ("Odieresis", '\u{d6}'),
    ("Oslash", '\u{d8}'),
    ("Udieresis", '\u{dc}'),
];

/// Unicode character for a glyph name from a font's `/Differences` array.
///
/// Understands `uniXXXX`, `uXXXX[XX]`, single-letter names, suffixed
/// variants such as `a.sc`, and a table of common names.
pub fn glyph_name_to_char(name: &str) -> Option<char> {
    if let Some((base, _)) = name.split_once('.') {
        if !base.is_empty() {
            return glyph_name_to_char(base);
        }
    }

    let mut chars = name.chars();
    if let (Some(only), None) = (chars.next(), chars.next()) {
        if only.is_ascii_alphabetic() {
            return Some(only);
        }
    }

    let unicode = match (name.strip_prefix("uni"), name.strip_prefix('u')) {
        (Some(hex), _) if hex.len() >= 4 => hex.get(..4).and_then(hex_char),
        (_, Some(hex)) if (4..=6).contains(&hex.len()) => hex_char(hex),
        _ => None,
    };
    if unicode.is_some() {
        return unicode;
    }

    GLYPH_NAMES
        .iter()
        .find(|(glyph, _)| *glyph == name)
        .map(|(_, ch)| *ch)
}

fn hex_char(hex: &str) -> Option<char> {
    u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
}

#[cfg(test)]
mod tests {
    use super::glyph_name_to_char;

    #[test]
    fn names_resolve_by_form() {
        assert_eq!(glyph_name_to_char("A"), Some('A'));
        assert_eq!(glyph_name_to_char("uni20AC"), Some('\u{20ac}'));
        assert_eq!(glyph_name_to_char("u1F600"), Some('\u{1f600}'));
        assert_eq!(glyph_name_to_char("quotedblleft"), Some('\u{201c}'));
        assert_eq!(glyph_name_to_char("a.sc"), Some('a'));
        assert_eq!(glyph_name_to_char("underscore"), Some('_'));
        assert_eq!(glyph_name_to_char("uacute"), Some('\u{fa}'));
        assert_eq!(glyph_name_to_char("g1234"), None);
    }
}
