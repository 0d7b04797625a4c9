//! Named character references.
//!
//! The table holds the full HTML 4.01 set, plus the HTML5 names most likely to
//! show up in hand-written markup. Legacy names are the ones HTML5 still
//! accepts without the closing `;`.

use std::sync::LazyLock;

/// Part of the HTML 4.01 set, and so of HTML5 too.
const HTML4: u8 = 0b01;
/// May appear without a terminating `;`.
const LEGACY: u8 = 0b10;
/// HTML5 only.
const HTML5: u8 = 0;

#[derive(Debug)]
pub(crate) struct Entity {
    pub(crate) name: &'static str,
    pub(crate) value: char,
    flags: u8,
}

impl Entity {
    pub(crate) const fn is_html4(&self) -> bool {
        self.flags & HTML4 != 0
    }

    pub(crate) const fn is_legacy(&self) -> bool {
        self.flags & LEGACY != 0
    }
}

const fn entity(name: &'static str, value: char, flags: u8) -> Entity {
    Entity { name, value, flags }
}

/// Longest name in [`ENTITIES`].
pub(crate) const MAX_NAME_LEN: usize = 16;

static ENTITIES: &[Entity] = &[
    entity("quot", '\u{22}', HTML4 | LEGACY),
    entity("amp", '\u{26}', HTML4 | LEGACY),
    entity("lt", '\u{3C}', HTML4 | LEGACY),
    entity("gt", '\u{3E}', HTML4 | LEGACY),
    entity("nbsp", '\u{A0}', HTML4 | LEGACY),
    entity("iexcl", '\u{A1}', HTML4 | LEGACY),
    entity("cent", '\u{A2}', HTML4 | LEGACY),
    entity("pound", '\u{A3}', HTML4 | LEGACY),
    entity("curren", '\u{A4}', HTML4 | LEGACY),
    entity("yen", '\u{A5}', HTML4 | LEGACY),
    entity("brvbar", '\u{A6}', HTML4 | LEGACY),
    entity("sect", '\u{A7}', HTML4 | LEGACY),
    entity("uml", '\u{A8}', HTML4 | LEGACY),
    entity("copy", '\u{A9}', HTML4 | LEGACY),
    entity("ordf", '\u{AA}', HTML4 | LEGACY),
    entity("laquo", '\u{AB}', HTML4 | LEGACY),
    entity("not", '\u{AC}', HTML4 | LEGACY),
    entity("shy", '\u{AD}', HTML4 | LEGACY),
    entity("reg", '\u{AE}', HTML4 | LEGACY),
    entity("macr", '\u{AF}', HTML4 | LEGACY),
    entity("deg", '\u{B0}', HTML4 | LEGACY),
    entity("plusmn", '\u{B1}', HTML4 | LEGACY),
    entity("sup2", '\u{B2}', HTML4 | LEGACY),
    entity("sup3", '\u{B3}', HTML4 | LEGACY),
    entity("acute", '\u{B4}', HTML4 | LEGACY),
    entity("micro", '\u{B5}', HTML4 | LEGACY),
    entity("para", '\u{B6}', HTML4 | LEGACY),
    entity("middot", '\u{B7}', HTML4 | LEGACY),
    entity("cedil", '\u{B8}', HTML4 | LEGACY),
    entity("sup1", '\u{B9}', HTML4 | LEGACY),
    entity("ordm", '\u{BA}', HTML4 | LEGACY),
    entity("raquo", '\u{BB}', HTML4 | LEGACY),
    entity("frac14", '\u{BC}', HTML4 | LEGACY),
    entity("frac12", '\u{BD}', HTML4 | LEGACY),
    entity("frac34", '\u{BE}', HTML4 | LEGACY),
    entity("iquest", '\u{BF}', HTML4 | LEGACY),
    entity("Agrave", '\u{C0}', HTML4 | LEGACY),
    entity("Aacute", '\u{C1}', HTML4 | LEGACY),
    entity("Acirc", '\u{C2}', HTML4 | LEGACY),
    entity("Atilde", '\u{C3}', HTML4 | LEGACY),
    entity("Auml", '\u{C4}', HTML4 | LEGACY),
    entity("Aring", '\u{C5}', HTML4 | LEGACY),
    entity("AElig", '\u{C6}', HTML4 | LEGACY),
    entity("Ccedil", '\u{C7}', HTML4 | LEGACY),
    entity("Egrave", '\u{C8}', HTML4 | LEGACY),
    entity("Eacute", '\u{C9}', HTML4 | LEGACY),
    entity("Ecirc", '\u{CA}', HTML4 | LEGACY),
    entity("Euml", '\u{CB}', HTML4 | LEGACY),
    entity("Igrave", '\u{CC}', HTML4 | LEGACY),
    entity("Iacute", '\u{CD}', HTML4 | LEGACY),
    entity("Icirc", '\u{CE}', HTML4 | LEGACY),
    entity("Iuml", '\u{CF}', HTML4 | LEGACY),
    entity("ETH", '\u{D0}', HTML4 | LEGACY),
    entity("Ntilde", '\u{D1}', HTML4 | LEGACY),
    entity("Ograve", '\u{D2}', HTML4 | LEGACY),
    entity("Oacute", '\u{D3}', HTML4 | LEGACY),
    entity("Ocirc", '\u{D4}', HTML4 | LEGACY),
    entity("Otilde", '\u{D5}', HTML4 | LEGACY),
    entity("Ouml", '\u{D6}', HTML4 | LEGACY),
    entity("times", '\u{D7}', HTML4 | LEGACY),
    entity("Oslash", '\u{D8}', HTML4 | LEGACY),
    entity("Ugrave", '\u{D9}', HTML4 | LEGACY),
    entity("Uacute", '\u{DA}', HTML4 | LEGACY),
    entity("Ucirc", '\u{DB}', HTML4 | LEGACY),
    entity("Uuml", '\u{DC}', HTML4 | LEGACY),
    entity("Yacute", '\u{DD}', HTML4 | LEGACY),
    entity("THORN", '\u{DE}', HTML4 | LEGACY),
    entity("szlig", '\u{DF}', HTML4 | LEGACY),
    entity("agrave", '\u{E0}', HTML4 | LEGACY),
    entity("aacute", '\u{E1}', HTML4 | LEGACY),
    entity("acirc", '\u{E2}', HTML4 | LEGACY),
    entity("atilde", '\u{E3}', HTML4 | LEGACY),
    entity("auml", '\u{E4}', HTML4 | LEGACY),
    entity("aring", '\u{E5}', HTML4 | LEGACY),
    entity("aelig", '\u{E6}', HTML4 | LEGACY),
    entity("ccedil", '\u{E7}', HTML4 | LEGACY),
    entity("egrave", '\u{E8}', HTML4 | LEGACY),
    entity("eacute", '\u{E9}', HTML4 | LEGACY),
    entity("ecirc", '\u{EA}', HTML4 | LEGACY),
    entity("euml", '\u{EB}', HTML4 | LEGACY),
    entity("igrave", '\u{EC}', HTML4 | LEGACY),
    entity("iacute", '\u{ED}', HTML4 | LEGACY),
    entity("icirc", '\u{EE}', HTML4 | LEGACY),
    entity("iuml", '\u{EF}', HTML4 | LEGACY),
    entity("eth", '\u{F0}', HTML4 | LEGACY),
    entity("ntilde", '\u{F1}', HTML4 | LEGACY),
    entity("ograve", '\u{F2}', HTML4 | LEGACY),
    entity("oacute", '\u{F3}', HTML4 | LEGACY),
    entity("ocirc", '\u{F4}', HTML4 | LEGACY),
    entity("otilde", '\u{F5}', HTML4 | LEGACY),
    entity("ouml", '\u{F6}', HTML4 | LEGACY),
    entity("divide", '\u{F7}', HTML4 | LEGACY),
    entity("oslash", '\u{F8}', HTML4 | LEGACY),
    entity("ugrave", '\u{F9}', HTML4 | LEGACY),
    entity("uacute", '\u{FA}', HTML4 | LEGACY),
    entity("ucirc", '\u{FB}', HTML4 | LEGACY),
    entity("uuml", '\u{FC}', HTML4 | LEGACY),
    entity("yacute", '\u{FD}', HTML4 | LEGACY),
    entity("thorn", '\u{FE}', HTML4 | LEGACY),
    entity("yuml", '\u{FF}', HTML4 | LEGACY),
    entity("OElig", '\u{152}', HTML4),
    entity("oelig", '\u{153}', HTML4),
    entity("Scaron", '\u{160}', HTML4),
    entity("scaron", '\u{161}', HTML4),
    entity("Yuml", '\u{178}', HTML4),
    entity("fnof", '\u{192}', HTML4),
    entity("circ", '\u{2C6}', HTML4),
    entity("tilde", '\u{2DC}', HTML4),
    entity("Alpha", '\u{391}', HTML4),
    entity("Beta", '\u{392}', HTML4),
    entity("Gamma", '\u{393}', HTML4),
    entity("Delta", '\u{394}', HTML4),
    entity("Epsilon", '\u{395}', HTML4),
    entity("Zeta", '\u{396}', HTML4),
    entity("Eta", '\u{397}', HTML4),
    entity("Theta", '\u{398}', HTML4),
    entity("Iota", '\u{399}', HTML4),
    entity("Kappa", '\u{39A}', HTML4),
    entity("Lambda", '\u{39B}', HTML4),
    entity("Mu", '\u{39C}', HTML4),
    entity("Nu", '\u{39D}', HTML4),
    entity("Xi", '\u{39E}', HTML4),
    entity("Omicron", '\u{39F}', HTML4),
    entity("Pi", '\u{3A0}', HTML4),
    entity("Rho", '\u{3A1}', HTML4),
    entity("Sigma", '\u{3A3}', HTML4),
    entity("Tau", '\u{3A4}', HTML4),
    entity("Upsilon", '\u{3A5}', HTML4),
    entity("Phi", '\u{3A6}', HTML4),
    entity("Chi", '\u{3A7}', HTML4),
    entity("Psi", '\u{3A8}', HTML4),
    entity("Omega", '\u{3A9}', HTML4),
    entity("alpha", '\u{3B1}', HTML4),
    entity("beta", '\u{3B2}', HTML4),
    entity("gamma", '\u{3B3}', HTML4),
    entity("delta", '\u{3B4}', HTML4),
    entity("epsilon", '\u{3B5}', HTML4),
    entity("zeta", '\u{3B6}', HTML4),
    entity("eta", '\u{3B7}', HTML4),
    entity("theta", '\u{3B8}', HTML4),
    entity("iota", '\u{3B9}', HTML4),
    entity("kappa", '\u{3BA}', HTML4),
    entity("lambda", '\u{3BB}', HTML4),
    entity("mu", '\u{3BC}', HTML4),
    entity("nu", '\u{3BD}', HTML4),
    entity("xi", '\u{3BE}', HTML4),
    entity("omicron", '\u{3BF}', HTML4),
    entity("pi", '\u{3C0}', HTML4),
    entity("rho", '\u{3C1}', HTML4),
    entity("sigmaf", '\u{3C2}', HTML4),
    entity("sigma", '\u{3C3}', HTML4),
    entity("tau", '\u{3C4}', HTML4),
    entity("upsilon", '\u{3C5}', HTML4),
    entity("phi", '\u{3C6}', HTML4),
    entity("chi", '\u{3C7}', HTML4),
    entity("psi", '\u{3C8}', HTML4),
    entity("omega", '\u{3C9}', HTML4),
    entity("thetasym", '\u{3D1}', HTML4),
    entity("upsih", '\u{3D2}', HTML4),
    entity("piv", '\u{3D6}', HTML4),
    entity("ensp", '\u{2002}', HTML4),
    entity("emsp", '\u{2003}', HTML4),
    entity("thinsp", '\u{2009}', HTML4),
    entity("zwnj", '\u{200C}', HTML4),
    entity("zwj", '\u{200D}', HTML4),
    entity("lrm", '\u{200E}', HTML4),
    entity("rlm", '\u{200F}', HTML4),
    entity("ndash", '\u{2013}', HTML4),
    entity("mdash", '\u{2014}', HTML4),
    entity("lsquo", '\u{2018}', HTML4),
    entity("rsquo", '\u{2019}', HTML4),
    entity("sbquo", '\u{201A}', HTML4),
    entity("ldquo", '\u{201C}', HTML4),
    entity("rdquo", '\u{201D}', HTML4),
    entity("bdquo", '\u{201E}', HTML4),
    entity("dagger", '\u{2020}', HTML4),
    entity("Dagger", '\u{2021}', HTML4),
    entity("bull", '\u{2022}', HTML4),
    entity("hellip", '\u{2026}', HTML4),
    entity("permil", '\u{2030}', HTML4),
    entity("prime", '\u{2032}', HTML4),
    entity("Prime", '\u{2033}', HTML4),
    entity("lsaquo", '\u{2039}', HTML4),
    entity("rsaquo", '\u{203A}', HTML4),
    entity("oline", '\u{203E}', HTML4),
    entity("frasl", '\u{2044}', HTML4),
    entity("euro", '\u{20AC}', HTML4),
    entity("image", '\u{2111}', HTML4),
    entity("weierp", '\u{2118}', HTML4),
    entity("real", '\u{211C}', HTML4),
    entity("trade", '\u{2122}', HTML4),
    entity("alefsym", '\u{2135}', HTML4),
    entity("larr", '\u{2190}', HTML4),
    entity("uarr", '\u{2191}', HTML4),
    entity("rarr", '\u{2192}', HTML4),
    entity("darr", '\u{2193}', HTML4),
    entity("harr", '\u{2194}', HTML4),
    entity("crarr", '\u{21B5}', HTML4),
    entity("lArr", '\u{21D0}', HTML4),
    entity("uArr", '\u{21D1}', HTML4),
    entity("rArr", '\u{21D2}', HTML4),
    entity("dArr", '\u{21D3}', HTML4),
    entity("hArr", '\u{21D4}', HTML4),
    entity("forall", '\u{2200}', HTML4),
    entity("part", '\u{2202}', HTML4),
    entity("exist", '\u{2203}', HTML4),
    entity("empty", '\u{2205}', HTML4),
    entity("nabla", '\u{2207}', HTML4),
    entity("isin", '\u{2208}', HTML4),
    entity("notin", '\u{2209}', HTML4),
    entity("ni", '\u{220B}', HTML4),
    entity("prod", '\u{220F}', HTML4),
    entity("sum", '\u{2211}', HTML4),
    entity("minus", '\u{2212}', HTML4),
    entity("lowast", '\u{2217}', HTML4),
    entity("radic", '\u{221A}', HTML4),
    entity("prop", '\u{221D}', HTML4),
    entity("infin", '\u{221E}', HTML4),
    entity("ang", '\u{2220}', HTML4),
    entity("and", '\u{2227}', HTML4),
    entity("or", '\u{2228}', HTML4),
    entity("cap", '\u{2229}', HTML4),
    entity("cup", '\u{222A}', HTML4),
    entity("int", '\u{222B}', HTML4),
    entity("there4", '\u{2234}', HTML4),
    entity("sim", '\u{223C}', HTML4),
    entity("cong", '\u{2245}', HTML4),
    entity("asymp", '\u{2248}', HTML4),
    entity("ne", '\u{2260}', HTML4),
    entity("equiv", '\u{2261}', HTML4),
    entity("le", '\u{2264}', HTML4),
    entity("ge", '\u{2265}', HTML4),
    entity("sub", '\u{2282}', HTML4),
    entity("sup", '\u{2283}', HTML4),
    entity("nsub", '\u{2284}', HTML4),
    entity("sube", '\u{2286}', HTML4),
    entity("supe", '\u{2287}', HTML4),
    entity("oplus", '\u{2295}', HTML4),
    entity("otimes", '\u{2297}', HTML4),
    entity("perp", '\u{22A5}', HTML4),
    entity("sdot", '\u{22C5}', HTML4),
    entity("lceil", '\u{2308}', HTML4),
    entity("rceil", '\u{2309}', HTML4),
    entity("lfloor", '\u{230A}', HTML4),
    entity("rfloor", '\u{230B}', HTML4),
    entity("lang", '\u{2329}', HTML4),
    entity("rang", '\u{232A}', HTML4),
    entity("loz", '\u{25CA}', HTML4),
    entity("spades", '\u{2660}', HTML4),
    entity("clubs", '\u{2663}', HTML4),
    entity("hearts", '\u{2665}', HTML4),
    entity("diams", '\u{2666}', HTML4),
    entity("AMP", '\u{26}', LEGACY),
    entity("LT", '\u{3C}', LEGACY),
    entity("GT", '\u{3E}', LEGACY),
    entity("QUOT", '\u{22}', LEGACY),
    entity("COPY", '\u{A9}', LEGACY),
    entity("REG", '\u{AE}', LEGACY),
    entity("Tab", '\u{9}', HTML5),
    entity("NewLine", '\u{A}', HTML5),
    entity("excl", '\u{21}', HTML5),
    entity("num", '\u{23}', HTML5),
    entity("dollar", '\u{24}', HTML5),
    entity("percnt", '\u{25}', HTML5),
    entity("apos", '\u{27}', HTML5),
    entity("lpar", '\u{28}', HTML5),
    entity("rpar", '\u{29}', HTML5),
    entity("ast", '\u{2A}', HTML5),
    entity("midast", '\u{2A}', HTML5),
    entity("plus", '\u{2B}', HTML5),
    entity("comma", '\u{2C}', HTML5),
    entity("period", '\u{2E}', HTML5),
    entity("sol", '\u{2F}', HTML5),
    entity("colon", '\u{3A}', HTML5),
    entity("semi", '\u{3B}', HTML5),
    entity("equals", '\u{3D}', HTML5),
    entity("quest", '\u{3F}', HTML5),
    entity("commat", '\u{40}', HTML5),
    entity("lsqb", '\u{5B}', HTML5),
    entity("lbrack", '\u{5B}', HTML5),
    entity("bsol", '\u{5C}', HTML5),
    entity("rsqb", '\u{5D}', HTML5),
    entity("rbrack", '\u{5D}', HTML5),
    entity("Hat", '\u{5E}', HTML5),
    entity("lowbar", '\u{5F}', HTML5),
    entity("UnderBar", '\u{5F}', HTML5),
    entity("grave", '\u{60}', HTML5),
    entity("DiacriticalGrave", '\u{60}', HTML5),
    entity("lcub", '\u{7B}', HTML5),
    entity("lbrace", '\u{7B}', HTML5),
    entity("verbar", '\u{7C}', HTML5),
    entity("vert", '\u{7C}', HTML5),
    entity("VerticalLine", '\u{7C}', HTML5),
    entity("rcub", '\u{7D}', HTML5),
    entity("rbrace", '\u{7D}', HTML5),
    entity("NonBreakingSpace", '\u{A0}', HTML5),
    entity("half", '\u{BD}', HTML5),
    entity("centerdot", '\u{B7}', HTML5),
    entity("div", '\u{F7}', HTML5),
    entity("hyphen", '\u{2010}', HTML5),
    entity("dash", '\u{2010}', HTML5),
    entity("lsquor", '\u{201A}', HTML5),
    entity("ldquor", '\u{201E}', HTML5),
    entity("bullet", '\u{2022}', HTML5),
    entity("nldr", '\u{2025}', HTML5),
    entity("mldr", '\u{2026}', HTML5),
    entity("rarrw", '\u{219D}', HTML5),
    entity("check", '\u{2713}', HTML5),
    entity("cross", '\u{2717}', HTML5),
    entity("starf", '\u{2605}', HTML5),
    entity("star", '\u{2606}', HTML5),
    entity("phone", '\u{260E}', HTML5),
    entity("female", '\u{2640}', HTML5),
    entity("male", '\u{2642}', HTML5),
    entity("sharp", '\u{266F}', HTML5),
    entity("flat", '\u{266D}', HTML5),
    entity("natural", '\u{266E}', HTML5),
    entity("bigstar", '\u{2605}', HTML5),
    entity("TRADE", '\u{2122}', HTML5),
    entity("Copf", '\u{2102}', HTML5),
    entity("Nopf", '\u{2115}', HTML5),
    entity("Qopf", '\u{211A}', HTML5),
    entity("Ropf", '\u{211D}', HTML5),
    entity("Zopf", '\u{2124}', HTML5),
];

static BY_NAME: LazyLock<Vec<&'static Entity>> = LazyLock::new(|| {
    let mut index: Vec<_> = ENTITIES.iter().collect();
    index.sort_unstable_by_key(|e| e.name);
    index
});

static HTML4_BY_CHAR: LazyLock<Vec<(char, &'static str)>> =
    LazyLock::new(|| reverse_index(|e| e.is_html4()));

static HTML5_BY_CHAR: LazyLock<Vec<(char, &'static str)>> = LazyLock::new(|| reverse_index(|_| true));

/// One name per character: HTML 4.01 names win, then the shortest, then the
/// alphabetically first.
fn reverse_index(include: impl Fn(&Entity) -> bool) -> Vec<(char, &'static str)> {
    let mut candidates: Vec<&Entity> = ENTITIES.iter().filter(|e| include(e)).collect();
    candidates.sort_by_key(|e| (e.value, !e.is_html4(), e.name.len(), e.name));
    let mut index: Vec<(char, &'static str)> = candidates.iter().map(|e| (e.value, e.name)).collect();
    index.dedup_by_key(|(value, _)| *value);
    index
}

/// Looks up a name, without the surrounding `&` and `;`.
pub(crate) fn lookup(name: &str) -> Option<&'static Entity> {
    BY_NAME
        .binary_search_by(|e| e.name.cmp(name))
        .ok()
        .map(|i| BY_NAME[i])
}

/// The preferred name for `c`, if it has one.
pub(crate) fn name_for(c: char, html5: bool) -> Option<&'static str> {
    let index = if html5 { &HTML5_BY_CHAR } else { &HTML4_BY_CHAR };
    index
        .binary_search_by_key(&c, |&(value, _)| value)
        .ok()
        .map(|i| index[i].1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn names_are_unique_and_bounded() {
        let mut names: Vec<_> = ENTITIES.iter().map(|e| e.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ENTITIES.len());
        assert_eq!(ENTITIES.iter().map(|e| e.name.len()).max(), Some(MAX_NAME_LEN));
    }

    #[test]
    fn html4_set_is_complete() {
        assert_eq!(ENTITIES.iter().filter(|e| e.is_html4()).count(), 252);
    }

    #[test]
    fn lookup_is_case_sensitive() {
        assert_eq!(lookup("Eacute").map(|e| e.value), Some('\u{C9}'));
        assert_eq!(lookup("eacute").map(|e| e.value), Some('\u{E9}'));
        assert!(lookup("EACUTE").is_none());
        assert!(lookup("AMP").is_some_and(Entity::is_legacy));
        assert!(!lookup("hellip").is_some_and(Entity::is_legacy));
    }

    #[test]
    fn preferred_names() {
        assert_eq!(name_for('&', false), Some("amp"));
        assert_eq!(name_for('\'', false), None);
        assert_eq!(name_for('\'', true), Some("apos"));
        assert_eq!(name_for('\u{BD}', true), Some("frac12"));
        assert_eq!(name_for('\u{A0}', true), Some("nbsp"));
        assert_eq!(name_for('*', true), Some("ast"));
        assert_eq!(name_for('|', true), Some("vert"));
        assert_eq!(name_for('-', true), None);
    }
}
