use anstyle::{RgbColor, Style as AnsiStyle};

use std::{cell::RefCell, collections::BTreeMap, fmt::Display, rc::Rc};

/// Sub-elements a clock places on its surface, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Part {
    Hours,
    SeparatorHm,
    Minutes,
    SeparatorMs,
    Seconds,
    Ampm,
}

impl Part {
    pub const ALL: [Part; 6] = [
        Part::Hours,
        Part::SeparatorHm,
        Part::Minutes,
        Part::SeparatorMs,
        Part::Seconds,
        Part::Ampm,
    ];

    /// Text a freshly populated surface shows for this part.
    pub fn placeholder(&self) -> &'static str {
        match self {
            Part::Hours | Part::Minutes | Part::Seconds => "00",
            Part::SeparatorHm | Part::SeparatorMs => ":",
            Part::Ampm => "",
        }
    }
}

/// One mutable UI region a clock renders into.
pub trait Surface {
    /// Whether this region can host exactly one clock.
    fn is_single_target(&self) -> bool;

    fn is_bound(&self) -> bool;

    /// Declarative option value attached to the region.
    fn attribute(&self, name: &str) -> Option<String>;

    /// Empties the region and marks it as owned by a clock.
    fn bind(&mut self);

    fn unbind(&mut self);

    fn append(&mut self, part: Part, text: &str);

    fn set_text(&mut self, part: Part, text: &str);

    /// `animate_ms` of `None` applies the opacity immediately.
    fn set_opacity(&mut self, part: Part, opacity: f64, animate_ms: Option<u32>);

    fn set_visible(&mut self, part: Part, visible: bool, animate_ms: u32);
}

const CONTAINER_TAGS: [&str; 9] = ["span", "div", "p", "h1", "h2", "h3", "h4", "h5", "h6"];

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub part: Part,
    pub text: String,
    pub opacity: f64,
    pub visible: bool,
    /// Duration of the last opacity change, `None` when it was applied statically.
    pub transition_ms: Option<u32>,
}

impl Element {
    fn new(part: Part, text: &str) -> Self {
        Self {
            part,
            text: text.to_string(),
            opacity: 1.0,
            visible: true,
            transition_ms: None,
        }
    }

    fn style(&self) -> AnsiStyle {
        let level = (self.opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
        AnsiStyle::new().fg_color(Some(RgbColor(level, level, level).into()))
    }
}

#[derive(Debug, Default)]
struct SurfaceState {
    tag: String,
    bound: bool,
    attributes: BTreeMap<String, String>,
    children: Vec<Element>,
}

/// In-memory surface rendering to ANSI text. Clones share one region, so a
/// clone of a bound surface is itself bound.
#[derive(Debug, Clone)]
pub struct TextSurface(Rc<RefCell<SurfaceState>>);

impl Default for TextSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl TextSurface {
    pub fn new() -> Self {
        Self::with_tag("span")
    }

    pub fn with_tag(tag: &str) -> Self {
        Self(Rc::new(RefCell::new(SurfaceState {
            tag: tag.to_lowercase(),
            ..Default::default()
        })))
    }

    pub fn with_attribute(self, name: &str, value: &str) -> Self {
        self.0
            .borrow_mut()
            .attributes
            .insert(name.to_string(), value.to_string());
        self
    }

    pub fn element(&self, part: Part) -> Option<Element> {
        self.0
            .borrow()
            .children
            .iter()
            .find(|child| child.part == part)
            .cloned()
    }

    pub fn text(&self, part: Part) -> Option<String> {
        self.element(part).map(|element| element.text)
    }

    pub fn opacity(&self, part: Part) -> Option<f64> {
        self.element(part).map(|element| element.opacity)
    }

    pub fn is_visible(&self, part: Part) -> bool {
        self.element(part).map_or(false, |element| element.visible)
    }

    pub fn child_count(&self) -> usize {
        self.0.borrow().children.len()
    }

    fn with_element(&mut self, part: Part, f: impl FnOnce(&mut Element)) {
        if let Some(element) = self
            .0
            .borrow_mut()
            .children
            .iter_mut()
            .find(|child| child.part == part)
        {
            f(element);
        }
    }
}

impl Surface for TextSurface {
    fn is_single_target(&self) -> bool {
        CONTAINER_TAGS.contains(&self.0.borrow().tag.as_str())
    }

    fn is_bound(&self) -> bool {
        self.0.borrow().bound
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.0.borrow().attributes.get(name).cloned()
    }

    fn bind(&mut self) {
        let mut state = self.0.borrow_mut();
        state.children.clear();
        state.bound = true;
    }

    fn unbind(&mut self) {
        self.0.borrow_mut().bound = false;
    }

    fn append(&mut self, part: Part, text: &str) {
        self.0.borrow_mut().children.push(Element::new(part, text));
    }

    fn set_text(&mut self, part: Part, text: &str) {
        self.with_element(part, |element| element.text = text.to_string());
    }

    fn set_opacity(&mut self, part: Part, opacity: f64, animate_ms: Option<u32>) {
        self.with_element(part, |element| {
            element.opacity = opacity;
            element.transition_ms = animate_ms;
        });
    }

    fn set_visible(&mut self, part: Part, visible: bool, _animate_ms: u32) {
        self.with_element(part, |element| element.visible = visible);
    }
}

impl Display for TextSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for element in self.0.borrow().children.iter().filter(|e| e.visible) {
            let style = element.style();
            write!(f, "{}{}{}", style.render(), element.text, style.render_reset())?;
        }
        Ok(())
    }
}
