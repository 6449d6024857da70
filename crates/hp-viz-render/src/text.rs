//! Text layout helpers: ROOT-style `#latex` markup and approximate metrics.
//!
//! Labels arrive in ROOT TLatex notation (`t#bar{t}`, `H^{+}_{2}`,
//! `#sqrt{s}`). They are split into runs with a vertical shift so the SVG
//! writer can emit `<tspan>`s. Widths are estimated from Helvetica-like
//! advance classes; no font file is needed.

use crate::primitives::{FontWeight, TextStyle};

/// Size of super/subscript runs relative to the base text.
pub const SCRIPT_SCALE: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shift {
    Normal,
    Super,
    Sub,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    pub text: String,
    pub shift: Shift,
}

#[derive(Debug, Clone, Copy)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
    pub ascent: f64,
}

fn symbol(name: &str) -> Option<&'static str> {
    Some(match name {
        "alpha" => "\u{03B1}",
        "beta" => "\u{03B2}",
        "gamma" => "\u{03B3}",
        "delta" => "\u{03B4}",
        "epsilon" => "\u{03B5}",
        "zeta" => "\u{03B6}",
        "eta" => "\u{03B7}",
        "theta" => "\u{03B8}",
        "iota" => "\u{03B9}",
        "kappa" => "\u{03BA}",
        "lambda" => "\u{03BB}",
        "mu" => "\u{03BC}",
        "nu" => "\u{03BD}",
        "xi" => "\u{03BE}",
        "pi" => "\u{03C0}",
        "rho" => "\u{03C1}",
        "sigma" => "\u{03C3}",
        "tau" => "\u{03C4}",
        "upsilon" => "\u{03C5}",
        "phi" => "\u{03C6}",
        "chi" => "\u{03C7}",
        "psi" => "\u{03C8}",
        "omega" => "\u{03C9}",
        "Gamma" => "\u{0393}",
        "Delta" => "\u{0394}",
        "Theta" => "\u{0398}",
        "Lambda" => "\u{039B}",
        "Xi" => "\u{039E}",
        "Pi" => "\u{03A0}",
        "Sigma" => "\u{03A3}",
        "Phi" => "\u{03A6}",
        "Psi" => "\u{03A8}",
        "Omega" => "\u{03A9}",
        "rightarrow" => "\u{2192}",
        "leftarrow" => "\u{2190}",
        "leftrightarrow" => "\u{2194}",
        "pm" => "\u{00B1}",
        "mp" => "\u{2213}",
        "times" => "\u{00D7}",
        "cdot" => "\u{00B7}",
        "geq" => "\u{2265}",
        "leq" => "\u{2264}",
        "neq" => "\u{2260}",
        "approx" => "\u{2248}",
        "infty" => "\u{221E}",
        "ell" => "\u{2113}",
        "circ" => "\u{00B0}",
        "sqrt" => "\u{221A}",
        _ => return None,
    })
}

/// Braced group (or single character) starting at `i`; returns the inner
/// text and the index after it.
fn read_group(chars: &[char], i: usize) -> (String, usize) {
    match chars.get(i) {
        Some('{') => {
            let mut depth = 0usize;
            for (j, &c) in chars.iter().enumerate().skip(i) {
                match c {
                    '{' => depth += 1,
                    '}' => {
                        depth -= 1;
                        if depth == 0 {
                            return (chars[i + 1..j].iter().collect(), j + 1);
                        }
                    }
                    _ => {}
                }
            }
            // unbalanced: take the rest
            (chars[i + 1..].iter().collect(), chars.len())
        }
        Some(&c) => (c.to_string(), i + 1),
        None => (String::new(), i),
    }
}

fn push(runs: &mut Vec<TextRun>, text: &str, shift: Shift) {
    if text.is_empty() {
        return;
    }
    match runs.last_mut() {
        Some(last) if last.shift == shift => last.text.push_str(text),
        _ => runs.push(TextRun { text: text.to_string(), shift }),
    }
}

fn parse_into(s: &str, shift: Shift, runs: &mut Vec<TextRun>) {
    let chars: Vec<char> = s.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '#' => {
                let start = i + 1;
                let mut end = start;
                while end < chars.len() && chars[end].is_ascii_alphabetic() {
                    end += 1;
                }
                let name: String = chars[start..end].iter().collect();
                match name.as_str() {
                    "bar" => {
                        let (inner, next) = read_group(&chars, end);
                        let mut sub = Vec::new();
                        parse_into(&inner, shift, &mut sub);
                        for run in sub {
                            let barred: String =
                                run.text.chars().flat_map(|c| [c, '\u{0305}']).collect();
                            push(runs, &barred, run.shift);
                        }
                        i = next;
                    }
                    "sqrt" if chars.get(end) == Some(&'{') => {
                        push(runs, "\u{221A}", shift);
                        let (inner, next) = read_group(&chars, end);
                        parse_into(&inner, shift, runs);
                        i = next;
                    }
                    "it" | "bf" | "mathrm" if chars.get(end) == Some(&'{') => {
                        let (inner, next) = read_group(&chars, end);
                        parse_into(&inner, shift, runs);
                        i = next;
                    }
                    _ => {
                        match symbol(&name) {
                            Some(sym) => push(runs, sym, shift),
                            None => push(runs, &format!("#{name}"), shift),
                        }
                        i = end;
                    }
                }
            }
            c @ ('^' | '_') => {
                let script = if c == '^' { Shift::Super } else { Shift::Sub };
                let (inner, next) = read_group(&chars, i + 1);
                parse_into(&inner, script, runs);
                i = next;
            }
            '{' | '}' => i += 1,
            c => {
                push(runs, c.encode_utf8(&mut [0u8; 4]), shift);
                i += 1;
            }
        }
    }
}

/// Split ROOT TLatex markup into shifted runs.
pub fn parse_latex(s: &str) -> Vec<TextRun> {
    let mut runs = Vec::new();
    parse_into(s, Shift::Normal, &mut runs);
    runs
}

/// Markup with the shifts dropped.
pub fn plain_text(s: &str) -> String {
    parse_latex(s).into_iter().map(|r| r.text).collect()
}

fn advance(c: char) -> f64 {
    match c {
        '\u{0300}'..='\u{036F}' => 0.0,
        'i' | 'j' | 'l' | '|' | '!' | '\'' | '.' | ',' | ':' | ';' => 0.24,
        'f' | 't' | 'r' | 'I' | ' ' | '(' | ')' | '[' | ']' | '/' => 0.31,
        'm' | 'w' | 'M' | 'W' => 0.83,
        'A'..='Z' => 0.68,
        '0'..='9' => 0.556,
        'a'..='z' => 0.53,
        _ => 0.6,
    }
}

/// Approximate extent of `text` (markup allowed) at `style.size` pixels.
pub fn measure_styled(text: &str, style: &TextStyle) -> TextMetrics {
    let bold = if style.weight == FontWeight::Bold { 1.06 } else { 1.0 };
    let width: f64 = parse_latex(text)
        .iter()
        .map(|run| {
            let scale = if run.shift == Shift::Normal { 1.0 } else { SCRIPT_SCALE };
            run.text.chars().map(advance).sum::<f64>() * scale
        })
        .sum::<f64>()
        * style.size
        * bold;
    TextMetrics { width, height: style.size * 1.15, ascent: style.size * 0.72 }
}
