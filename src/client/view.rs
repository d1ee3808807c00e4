use std::io::Write;

pub const LOADING_TEXT: &str = "Thinking...";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BubbleKind {
    User,
    Assistant,
    Loading,
    Error,
}

impl BubbleKind {
    pub fn css_class(&self) -> &'static str {
        match self {
            BubbleKind::User => "msg user",
            BubbleKind::Assistant => "msg ai",
            BubbleKind::Loading => "msg ai loading",
            BubbleKind::Error => "msg ai error",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bubble {
    pub kind: BubbleKind,
    pub text: String,
}

impl Bubble {
    pub fn new(kind: BubbleKind, text: impl Into<String>) -> Self {
        Self { kind, text: text.into() }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BubbleId(pub usize);

/// Where chat bubbles are shown. System messages never reach a view.
pub trait ChatView: Send {
    fn clear(&mut self);

    fn append(&mut self, bubble: Bubble) -> BubbleId;

    fn replace(&mut self, id: BubbleId, bubble: Bubble);
}

pub fn escape_html(unsafe_text: &str) -> String {
    let mut out = String::with_capacity(unsafe_text.len());
    for c in unsafe_text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Keeps bubbles as markup, one `div` per bubble.
#[derive(Debug, Default)]
pub struct HtmlView {
    bubbles: Vec<Bubble>,
}

impl HtmlView {
    pub fn bubbles(&self) -> &[Bubble] {
        &self.bubbles
    }

    pub fn render(&self) -> String {
        self.bubbles
            .iter()
            .map(|b| format!("<div class=\"{}\">{}</div>", b.kind.css_class(), escape_html(&b.text)))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl ChatView for HtmlView {
    fn clear(&mut self) {
        self.bubbles.clear();
    }

    fn append(&mut self, bubble: Bubble) -> BubbleId {
        self.bubbles.push(bubble);
        BubbleId(self.bubbles.len() - 1)
    }

    fn replace(&mut self, id: BubbleId, bubble: Bubble) {
        if let Some(slot) = self.bubbles.get_mut(id.0) {
            *slot = bubble;
        }
    }
}

/// Prints bubbles as they arrive. A replaced placeholder is printed again.
pub struct TerminalView<W: Write + Send> {
    out: W,
    next_id: usize,
}

impl<W: Write + Send> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self { out, next_id: 0 }
    }

    fn print(&mut self, bubble: &Bubble) {
        let label = match bubble.kind {
            BubbleKind::User => "you",
            BubbleKind::Assistant | BubbleKind::Loading | BubbleKind::Error => "advisor",
        };
        // Terminal output failures are not actionable here.
        let _ = writeln!(self.out, "{}> {}", label, bubble.text);
        let _ = self.out.flush();
    }
}

impl<W: Write + Send> ChatView for TerminalView<W> {
    fn clear(&mut self) {
        self.next_id = 0;
    }

    fn append(&mut self, bubble: Bubble) -> BubbleId {
        self.print(&bubble);
        self.next_id += 1;
        BubbleId(self.next_id - 1)
    }

    fn replace(&mut self, _id: BubbleId, bubble: Bubble) {
        self.print(&bubble);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<script>alert("x" & 'y')</script>"#),
            "&lt;script&gt;alert(&quot;x&quot; &amp; &#039;y&#039;)&lt;/script&gt;"
        );
    }

    #[test]
    fn html_view_never_emits_raw_script() {
        let mut view = HtmlView::default();
        view.append(Bubble::new(BubbleKind::User, "<script>steal()</script>"));
        let html = view.render();
        assert_eq!(html, "<div class=\"msg user\">&lt;script&gt;steal()&lt;/script&gt;</div>");
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn placeholder_is_replaced_in_place() {
        let mut view = HtmlView::default();
        view.append(Bubble::new(BubbleKind::User, "hi"));
        let id = view.append(Bubble::new(BubbleKind::Loading, LOADING_TEXT));
        view.replace(id, Bubble::new(BubbleKind::Error, "Error: down"));

        assert_eq!(view.bubbles().len(), 2);
        assert_eq!(view.render().lines().last(), Some("<div class=\"msg ai error\">Error: down</div>"));
    }

    #[test]
    fn terminal_view_prints_each_update() {
        let mut view = TerminalView::new(Vec::new());
        view.append(Bubble::new(BubbleKind::User, "hello"));
        let id = view.append(Bubble::new(BubbleKind::Loading, LOADING_TEXT));
        view.replace(id, Bubble::new(BubbleKind::Assistant, "Hi there"));

        let printed = String::from_utf8(view.out).unwrap();
        assert_eq!(printed, "you> hello\nadvisor> Thinking...\nadvisor> Hi there\n");
    }
}
