//! Greedy word-wrapping text layout.
//!
//! Text is split into tokens (words, single spaces, newlines), measured
//! through the host shaper and placed line by line. Lines break on `\n` or
//! when the next token would overflow the maximum width.
//!
//! Inline markup is recognised while tokenizing:
//!
//! - `*bold*`, `_italic_`, `|centered|`, `#big#`, `~small~` toggle a style
//! - `@rule{...}` applies `rule` to the enclosed text, where `rule` is a
//!   size factor (`@1.5{...}`), one of `bold`, `italic`, `center`, `right`,
//!   `small`, `big`, `sub`, or otherwise a color name
//!
//! Markup state does not carry across newlines.

use canopy_hostapi::text::{Caret, PlacedRun, TextLayout, TextPaint, TextShaper, TextStyle};
use canopy_primitives::wire::Font;
use canopy_primitives::Color;

/// Parameters of one text block.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock<'a> {
    pub content: &'a str,
    /// 0 when unconstrained.
    pub max_width: f32,
    pub padding: f32,
    pub size: f32,
    pub font: Font,
    pub bold: bool,
    pub italic: bool,
    pub color: Color,
    /// Caret position in characters; negative when there is no caret.
    pub cursor_index: i32,
    pub background: Color,
    pub border: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone)]
struct Token {
    content: String,
    style: TextStyle,
    align: LineAlign,
    /// Subscript: sits on the line bottom instead of being centred.
    lowered: bool,
    x: f32,
    y: f32,
}

impl Token {
    fn is_newline(&self) -> bool {
        self.content == "\n"
    }

    fn is_blank(&self) -> bool {
        self.content == " " || self.is_newline()
    }
}

struct Line {
    tokens: Vec<Token>,
    width: f32,
    height: f32,
    align: LineAlign,
}

const DESCENDERS: [char; 5] = ['g', 'j', 'p', 'q', 'y'];

fn shortcut_rule(c: char) -> Option<&'static str> {
    match c {
        '*' => Some("bold"),
        '_' => Some("italic"),
        '|' => Some("center"),
        '#' => Some("big"),
        '~' => Some("small"),
        _ => None,
    }
}

fn make_token(content: String, base: &TextStyle, rules: &[String]) -> Token {
    let mut token = Token {
        content,
        style: base.clone(),
        align: LineAlign::Left,
        lowered: false,
        x: 0.0,
        y: 0.0,
    };
    for rule in rules {
        if let Ok(factor) = rule.trim().parse::<f32>() {
            token.style.size *= factor;
            continue;
        }
        match rule.as_str() {
            "right" => token.align = LineAlign::Right,
            "center" => token.align = LineAlign::Center,
            "bold" => token.style.bold = true,
            "italic" => token.style.italic = true,
            "small" => token.style.size *= 0.75,
            "big" => token.style.size *= 1.6,
            "sub" => {
                token.style.size *= 0.5;
                token.lowered = true;
            }
            color => token.style.paint = TextPaint::Named(color.to_string()),
        }
    }
    token
}

fn tokenize(text: &str, base: &TextStyle) -> Vec<Token> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut active: Vec<char> = Vec::new();
    let mut rules: Vec<String> = Vec::new();
    let mut content = String::new();

    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if let Some(rule) = shortcut_rule(c) {
            tokens.push(make_token(std::mem::take(&mut content), base, &rules));
            if let Some(pos) = active.iter().position(|a| *a == c) {
                active.remove(pos);
                if let Some(idx) = rules.iter().rposition(|r| r == rule) {
                    rules.remove(idx);
                }
            } else {
                active.push(c);
                rules.push(rule.to_string());
            }
        } else if c == '@' {
            match chars[i + 1..].iter().position(|ch| *ch == '{') {
                Some(offset) => {
                    let bracket = i + 1 + offset;
                    tokens.push(make_token(std::mem::take(&mut content), base, &rules));
                    rules.push(chars[i + 1..bracket].iter().collect());
                    i = bracket;
                }
                None => content.push(c),
            }
        } else if c == '}' && !rules.is_empty() {
            tokens.push(make_token(std::mem::take(&mut content), base, &rules));
            rules.pop();
        } else if c == '\n' {
            tokens.push(make_token(std::mem::take(&mut content), base, &rules));
            tokens.push(make_token("\n".to_string(), base, &rules));
            rules.clear();
            active.clear();
        } else if c == ' ' {
            let word = make_token(std::mem::take(&mut content), base, &rules);
            let mut space = word.clone();
            space.content = " ".to_string();
            tokens.push(word);
            tokens.push(space);
        } else {
            content.push(c);
        }
        i += 1;
    }
    tokens.push(make_token(content, base, &rules));
    tokens.retain(|t| !t.content.is_empty());
    tokens
}

/// Lay out `block`, measuring every token with `shaper`.
pub fn layout_text(block: &TextBlock<'_>, shaper: &mut dyn TextShaper) -> TextLayout {
    let base = TextStyle {
        font: block.font,
        size: block.size,
        bold: block.bold,
        italic: block.italic,
        paint: TextPaint::Rgba(block.color),
    };
    let padding = block.padding;
    let max_line_width = if block.max_width > 0.0 {
        block.max_width - padding * 2.0
    } else {
        f32::INFINITY
    };
    let start_x = padding + 1.0;
    let start_y = padding;
    let suffix = if block.cursor_index > -1 { " \n" } else { "\n" };
    let tokens = tokenize(&format!("{}{suffix}", block.content), &base);

    let mut lines: Vec<Line> = Vec::new();
    let mut x = start_x;
    let mut y = start_y;
    let mut current: Vec<Token> = Vec::new();
    let mut line_width = 0.0f32;
    let mut longest = 0.0f32;
    let mut line_height = block.size;
    let mut previous_height = 0.0f32;
    let mut line_align = LineAlign::Left;
    let mut after_newline = false;

    for (i, mut token) in tokens.into_iter().enumerate() {
        let newline = token.is_newline();
        let width = if newline {
            0.0
        } else {
            shaper.measure(&token.content, &token.style)
        };

        if newline || (line_width + width > max_line_width && !current.is_empty()) {
            if current.is_empty() {
                line_height = (block.size * 2.0 / 3.0).ceil();
            }
            y += if line_height > 0.0 { line_height } else { previous_height };
            for placed in &mut current {
                placed.y = y;
            }
            lines.push(Line {
                tokens: std::mem::take(&mut current),
                width: line_width,
                height: line_height,
                align: line_align,
            });
            line_width = if token.is_blank() { 0.0 } else { width };
            x = start_x;
            if line_height > 0.0 {
                previous_height = line_height;
            }
            line_height = 0.0;
        } else {
            line_width += width;
        }

        if !newline {
            line_height = line_height.max(token.style.size + 2.0);
            line_align = token.align;
        }
        longest = longest.max(line_width);

        if !newline {
            token.x = x;
            let advances = token.content != " " || x != start_x || after_newline;
            if token.content != " " || !current.is_empty() || i == 0 {
                current.push(token);
            }
            if advances {
                x += width;
            }
        }
        after_newline = newline;
    }

    for line in &mut lines {
        let spare = longest - line.width;
        let offset = match line.align {
            LineAlign::Left => 0.0,
            LineAlign::Center => spare / 2.0,
            LineAlign::Right => spare,
        };
        for token in &mut line.tokens {
            let lift = if token.lowered { -0.1 } else { 0.3 };
            token.x += offset;
            token.y -= (line.height - token.style.size) * lift;
        }
    }

    if let [line] = lines.as_mut_slice() {
        let descends = line
            .tokens
            .iter()
            .any(|t| t.content.chars().any(|c| DESCENDERS.contains(&c)));
        if !descends {
            for token in &mut line.tokens {
                token.y += line.height * 0.09;
            }
        }
    }

    let caret = place_caret(&lines, block.cursor_index, shaper);
    let caret_paint = caret
        .as_ref()
        .map_or_else(|| base.paint.clone(), |(_, paint)| paint.clone());

    TextLayout {
        width: (longest + padding * 2.0 + 2.0).round().max(0.0) as u32,
        height: (y - start_y + padding * 2.0 + 1.0).round().max(0.0) as u32,
        runs: lines
            .into_iter()
            .flat_map(|line| line.tokens)
            .map(|t| PlacedRun {
                content: t.content,
                style: t.style,
                x: t.x,
                y: t.y,
            })
            .collect(),
        caret: caret.map(|(c, _)| c),
        caret_paint,
        background: block.background,
        border: block.border,
    }
}

fn place_caret(lines: &[Line], cursor_index: i32, shaper: &mut dyn TextShaper) -> Option<(Caret, TextPaint)> {
    let cursor = usize::try_from(cursor_index).ok()?;
    let mut index = 0;
    for token in lines.iter().flat_map(|l| &l.tokens) {
        let next = index + token.content.chars().count();
        if cursor <= next {
            let before: String = token.content.chars().take(cursor - index).collect();
            let offset = shaper.measure(&before, &token.style);
            let size = token.style.size;
            let caret = Caret {
                x: (token.x + offset).round(),
                y: (token.y - size * 0.95).round(),
                width: 1.0,
                height: (size * 0.85).round(),
            };
            return Some((caret, token.style.paint.clone()));
        }
        index = next;
    }
    None
}
