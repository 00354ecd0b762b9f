//! In-memory document model.
//!
//! Elements live in an arena owned by [`Document`] and are addressed by
//! [`NodeId`]. Widgets hold ids, never references, so a single `&mut Document`
//! is all they need to read `data-*` attributes and toggle visibility.

use std::collections::BTreeMap;

/// Handle to an element inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// A single element.
#[derive(Debug, Clone, Default)]
pub struct Element {
    tag: String,
    attributes: BTreeMap<String, String>,
    classes: Vec<String>,
    styles: BTreeMap<String, String>,
    text: String,
    inner_html: Option<String>,
    value: String,
    checked: bool,
    disabled: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Default::default()
        }
    }

    /// Lowercase tag name.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The `id` attribute.
    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Set an attribute. `class` replaces the class list.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        if name == "class" {
            self.classes = value.split_whitespace().map(String::from).collect();
            return;
        }
        self.attributes.insert(name.to_string(), value);
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        self.attributes.remove(name)
    }

    /// Read a `data-*` attribute by its suffix (`data("product-handle")`).
    pub fn data(&self, key: &str) -> Option<&str> {
        self.attr(&format!("data-{}", key))
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    /// Add or remove a class depending on `on`.
    pub fn toggle_class(&mut self, class: &str, on: bool) {
        if on {
            self.add_class(class);
        } else {
            self.remove_class(class);
        }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Inline style property, if set.
    pub fn style(&self, property: &str) -> Option<&str> {
        self.styles.get(property).map(String::as_str)
    }

    /// Set an inline style property. An empty value clears it.
    pub fn set_style(&mut self, property: &str, value: &str) {
        if value.is_empty() {
            self.styles.remove(property);
        } else {
            self.styles.insert(property.to_string(), value.to_string());
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Raw markup assigned to the element. Not parsed.
    pub fn inner_html(&self) -> Option<&str> {
        self.inner_html.as_deref()
    }

    pub fn set_inner_html(&mut self, html: impl Into<String>) {
        self.inner_html = Some(html.into());
    }

    /// Form control value.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn checked(&self) -> bool {
        self.checked
    }

    pub fn set_checked(&mut self, checked: bool) {
        self.checked = checked;
    }

    pub fn disabled(&self) -> bool {
        self.disabled
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrMatch {
    Present(String),
    Equals(String, String),
    NotEquals(String, String),
}

/// A compound selector: every part must match.
///
/// Built with combinators rather than parsed, e.g.
/// `Selector::tag("input").with_attr_ne("type", "hidden")`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    tag: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrMatch>,
}

impl Selector {
    /// Match any element.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn tag(tag: &str) -> Self {
        Self {
            tag: Some(tag.to_ascii_lowercase()),
            ..Default::default()
        }
    }

    pub fn attr(name: &str) -> Self {
        Self::any().with_attr(name)
    }

    pub fn attr_eq(name: &str, value: &str) -> Self {
        Self::any().with_attr_eq(name, value)
    }

    pub fn class(class: &str) -> Self {
        Self::any().with_class(class)
    }

    pub fn with_attr(mut self, name: &str) -> Self {
        self.attrs.push(AttrMatch::Present(name.to_string()));
        self
    }

    pub fn with_attr_eq(mut self, name: &str, value: &str) -> Self {
        self.attrs
            .push(AttrMatch::Equals(name.to_string(), value.to_string()));
        self
    }

    /// Attribute absent or different from `value`.
    pub fn with_attr_ne(mut self, name: &str, value: &str) -> Self {
        self.attrs
            .push(AttrMatch::NotEquals(name.to_string(), value.to_string()));
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    pub fn matches(&self, element: &Element) -> bool {
        if let Some(ref tag) = self.tag {
            if element.tag != *tag {
                return false;
            }
        }
        if !self.classes.iter().all(|c| element.has_class(c)) {
            return false;
        }
        self.attrs.iter().all(|m| match m {
            AttrMatch::Present(name) => element.has_attr(name),
            AttrMatch::Equals(name, value) => element.attr(name) == Some(value.as_str()),
            AttrMatch::NotEquals(name, value) => element.attr(name) != Some(value.as_str()),
        })
    }
}

/// The page: an element tree with `html`, `head` and `body`, plus focus.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Element>,
    root: NodeId,
    head: NodeId,
    body: NodeId,
    active: Option<NodeId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty page.
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: vec![Element::new("html")],
            root: NodeId(0),
            head: NodeId(0),
            body: NodeId(0),
            active: None,
        };
        doc.head = doc.append_element(doc.root, "head", &[]);
        doc.body = doc.append_element(doc.root, "body", &[]);
        doc
    }

    /// The `html` element.
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn head(&self) -> NodeId {
        self.head
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn element(&self, id: NodeId) -> &Element {
        &self.nodes[id.0]
    }

    pub fn element_mut(&mut self, id: NodeId) -> &mut Element {
        &mut self.nodes[id.0]
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.nodes.push(Element::new(tag));
        NodeId(self.nodes.len() - 1)
    }

    /// Create an element with attributes and append it to `parent`.
    pub fn append_element(&mut self, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let id = self.create_element(tag);
        for (name, value) in attrs {
            self.nodes[id.0].set_attr(name, *value);
        }
        self.append_child(parent, id);
        id
    }

    /// Move `child` to the end of `parent`'s children.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Move `child` to the front of `parent`'s children.
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.insert(0, child);
    }

    /// Detach `id` from its parent. The element stays addressable.
    pub fn remove(&mut self, id: NodeId) {
        self.detach(id);
        if let Some(active) = self.active {
            if active == id || self.contains(id, active) {
                self.active = None;
            }
        }
    }

    /// Detach every child of `id`. Focus inside them is dropped.
    pub fn clear_children(&mut self, id: NodeId) {
        if let Some(active) = self.active {
            if active != id && self.contains(id, active) {
                self.active = None;
            }
        }
        let children = std::mem::take(&mut self.nodes[id.0].children);
        for child in children {
            self.nodes[child.0].parent = None;
        }
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != id);
        }
    }

    /// Whether `node` is `ancestor` or one of its descendants.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes[id.0].parent;
        }
        false
    }

    /// Whether `id` is connected to the document root.
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.contains(self.root, id)
    }

    /// Descendants of `root` (excluding `root`) in document order.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[root.0].children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.nodes[id.0].children.iter().rev().copied());
        }
        out
    }

    /// First descendant of `root` matching `selector`.
    pub fn query(&self, root: NodeId, selector: &Selector) -> Option<NodeId> {
        self.descendants(root)
            .into_iter()
            .find(|id| selector.matches(self.element(*id)))
    }

    /// All descendants of `root` matching `selector`, in document order.
    pub fn query_all(&self, root: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.query_any(root, std::slice::from_ref(selector))
    }

    /// All descendants of `root` matching any of `selectors`, in document order.
    pub fn query_any(&self, root: NodeId, selectors: &[Selector]) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|id| selectors.iter().any(|s| s.matches(self.element(*id))))
            .collect()
    }

    /// First element in the page matching `selector`.
    pub fn find(&self, selector: &Selector) -> Option<NodeId> {
        self.query(self.root, selector)
    }

    /// Every element in the page matching `selector`.
    pub fn find_all(&self, selector: &Selector) -> Vec<NodeId> {
        self.query_all(self.root, selector)
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.find(&Selector::attr_eq("id", id))
    }

    /// Nearest inclusive ancestor of `id` matching `selector`.
    pub fn closest(&self, id: NodeId, selector: &Selector) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node) = current {
            if selector.matches(self.element(node)) {
                return Some(node);
            }
            current = self.nodes[node.0].parent;
        }
        None
    }

    /// Whether the element takes part in layout: connected, and neither it
    /// nor any ancestor is `display: none`, `visibility: hidden` or `inert`.
    pub fn is_rendered(&self, id: NodeId) -> bool {
        if !self.is_connected(id) {
            return false;
        }
        let mut current = Some(id);
        while let Some(node) = current {
            let el = self.element(node);
            if el.style("display") == Some("none")
                || el.style("visibility") == Some("hidden")
                || el.has_attr("inert")
            {
                return false;
            }
            current = el.parent;
        }
        true
    }

    /// Concatenated text of `id` and its descendants, trimmed.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut text = self.element(id).text.clone();
        for child in self.descendants(id) {
            text.push_str(&self.element(child).text);
        }
        text.trim().to_string()
    }

    /// Currently focused element.
    pub fn active_element(&self) -> Option<NodeId> {
        self.active
    }

    /// Move focus to `id`.
    pub fn focus(&mut self, id: NodeId) {
        self.active = Some(id);
    }

    /// Drop focus back to the body.
    pub fn blur(&mut self) {
        self.active = None;
    }
}
