//! Keeps keyboard focus inside a dialog while it is open.

use ogag_core::{Cancelable, Document, Element, EventBus, NodeId, Selector, StructuredLogger, SubscriptionId};

/// Keys the trap reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Tab,
    Escape,
    Other(String),
}

impl Key {
    /// From a DOM `KeyboardEvent.key` value.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Tab" => Key::Tab,
            "Escape" | "Esc" => Key::Escape,
            other => Key::Other(other.to_string()),
        }
    }
}

/// A keydown forwarded by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub shift: bool,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self { key, shift: false }
    }

    pub fn tab() -> Self {
        Self::new(Key::Tab)
    }

    pub fn shift_tab() -> Self {
        Self {
            key: Key::Tab,
            shift: true,
        }
    }

    pub fn escape() -> Self {
        Self::new(Key::Escape)
    }
}

/// What the trap did with a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Not for the trap (inactive, or an unrelated key).
    Ignored,
    /// Tab inside the cycle; the browser moves focus as usual.
    Default,
    /// Focus wrapped around; the host must prevent the default action.
    Wrapped,
    /// Escape was pressed. Listeners may have vetoed closing.
    Escape { default_prevented: bool },
}

/// Payload of the cancellable escape notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrapEscape {
    pub container: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusTrapOptions {
    /// Focus the first focusable element on activation.
    pub initial_focus: bool,
    /// Focus the trigger again on deactivation.
    pub return_focus: bool,
}

impl Default for FocusTrapOptions {
    fn default() -> Self {
        Self {
            initial_focus: false,
            return_focus: true,
        }
    }
}

/// Whether `el` can take keyboard focus, ignoring visibility.
fn is_focusable(el: &Element) -> bool {
    let disabled = el.disabled() || el.has_attr("disabled");
    let natively = match el.tag() {
        "a" | "area" => el.has_attr("href"),
        "input" => !disabled && el.attr("type") != Some("hidden"),
        "select" | "textarea" | "button" => !disabled,
        _ => false,
    };
    natively
        || el.attr("tabindex").is_some_and(|t| t != "-1")
        || el.attr("contenteditable") == Some("true")
}

/// Rendered focusable descendants of `container`, in document order.
pub fn focusable_elements(doc: &Document, container: NodeId) -> Vec<NodeId> {
    doc.descendants(container)
        .into_iter()
        .filter(|id| is_focusable(doc.element(*id)) && doc.is_rendered(*id))
        .collect()
}

/// Focus trap over one container.
#[derive(Debug)]
pub struct FocusTrap {
    container: NodeId,
    options: FocusTrapOptions,
    trigger: Option<NodeId>,
    focusable: Vec<NodeId>,
    active: bool,
    escape: EventBus<Cancelable<TrapEscape>>,
}

impl FocusTrap {
    pub fn new(container: NodeId, options: FocusTrapOptions) -> Self {
        Self {
            container,
            options,
            trigger: None,
            focusable: Vec::new(),
            active: false,
            escape: EventBus::new(),
        }
    }

    pub fn container(&self) -> NodeId {
        self.container
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Focusable elements cached at activation or the last refresh.
    pub fn focusable(&self) -> &[NodeId] {
        &self.focusable
    }

    /// Subscribe to the escape notification. Call
    /// [`Cancelable::prevent_default`] to keep the dialog open.
    pub fn on_escape(&mut self, handler: impl FnMut(&Cancelable<TrapEscape>) + 'static) -> SubscriptionId {
        self.escape.subscribe(handler)
    }

    /// Start trapping. `trigger` gets focus back on deactivation.
    pub fn activate(&mut self, doc: &mut Document, trigger: Option<NodeId>) {
        if self.active {
            return;
        }
        self.trigger = trigger;
        self.active = true;
        self.refresh(doc);

        if self.options.initial_focus {
            if let Some(first) = self.focusable.first() {
                doc.focus(*first);
            }
        }
        doc.element_mut(self.container).set_attr("aria-hidden", "false");
    }

    pub fn deactivate(&mut self, doc: &mut Document) {
        if !self.active {
            return;
        }
        self.active = false;

        if self.options.return_focus {
            if let Some(trigger) = self.trigger.take() {
                if doc.is_connected(trigger) {
                    doc.focus(trigger);
                }
            }
        }
        doc.element_mut(self.container).set_attr("aria-hidden", "true");
    }

    /// Recompute the focusable elements after the container's content changed.
    pub fn refresh(&mut self, doc: &Document) {
        self.focusable = focusable_elements(doc, self.container);
    }

    pub fn handle_key(&mut self, doc: &mut Document, event: &KeyEvent) -> KeyOutcome {
        if !self.active {
            return KeyOutcome::Ignored;
        }
        match event.key {
            Key::Tab => self.handle_tab(doc, event.shift),
            Key::Escape => {
                let escape = Cancelable::new(TrapEscape {
                    container: self.container,
                });
                self.escape.emit(&escape);
                KeyOutcome::Escape {
                    default_prevented: escape.is_default_prevented(),
                }
            }
            Key::Other(_) => KeyOutcome::Ignored,
        }
    }

    fn handle_tab(&self, doc: &mut Document, shift: bool) -> KeyOutcome {
        let (Some(first), Some(last)) = (self.focusable.first(), self.focusable.last()) else {
            return KeyOutcome::Default;
        };
        let current = doc.active_element();

        if shift && current == Some(*first) {
            doc.focus(*last);
            KeyOutcome::Wrapped
        } else if !shift && current == Some(*last) {
            doc.focus(*first);
            KeyOutcome::Wrapped
        } else {
            KeyOutcome::Default
        }
    }

    /// Focus moved to `target`. Returns true if it was pulled back inside.
    pub fn handle_focus_in(&self, doc: &mut Document, target: NodeId) -> bool {
        if !self.active || doc.contains(self.container, target) {
            return false;
        }
        let destination = self.focusable.first().copied().unwrap_or(self.container);
        doc.focus(destination);
        true
    }
}

/// Traps for every `[data-focus-trap]` container, driven by `aria-hidden`.
#[derive(Debug, Default)]
pub struct FocusTrapRegistry {
    traps: Vec<FocusTrap>,
    logger: StructuredLogger,
}

impl FocusTrapRegistry {
    pub fn discover(doc: &Document, logger: &StructuredLogger) -> Self {
        let traps: Vec<FocusTrap> = doc
            .find_all(&Selector::attr("data-focus-trap"))
            .into_iter()
            .map(|container| FocusTrap::new(container, FocusTrapOptions::default()))
            .collect();
        let logger = logger.child("focus-trap");
        logger
            .debug_builder("Focus traps registered")
            .field_i64("count", traps.len() as i64)
            .emit();
        Self { traps, logger }
    }

    pub fn len(&self) -> usize {
        self.traps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traps.is_empty()
    }

    pub fn get(&self, container: NodeId) -> Option<&FocusTrap> {
        self.traps.iter().find(|t| t.container == container)
    }

    pub fn get_mut(&mut self, container: NodeId) -> Option<&mut FocusTrap> {
        self.traps.iter_mut().find(|t| t.container == container)
    }

    /// The host saw `aria-hidden` change on `container`.
    pub fn on_aria_hidden_changed(&mut self, doc: &mut Document, container: NodeId) {
        let hidden = doc.element(container).attr("aria-hidden") == Some("true");
        let Some(trap) = self.traps.iter_mut().find(|t| t.container == container) else {
            return;
        };
        if !hidden && !trap.is_active() {
            let trigger = doc.active_element();
            trap.activate(doc, trigger);
            self.logger.debug("Focus trap activated");
        } else if hidden && trap.is_active() {
            trap.deactivate(doc);
            self.logger.debug("Focus trap deactivated");
        }
    }

    /// Forward a keydown to the active traps.
    pub fn handle_key(&mut self, doc: &mut Document, event: &KeyEvent) -> KeyOutcome {
        for trap in self.traps.iter_mut().filter(|t| t.is_active()) {
            let outcome = trap.handle_key(doc, event);
            if outcome != KeyOutcome::Ignored {
                return outcome;
            }
        }
        KeyOutcome::Ignored
    }

    /// Forward a focusin to the active traps.
    pub fn handle_focus_in(&self, doc: &mut Document, target: NodeId) -> bool {
        self.traps
            .iter()
            .filter(|t| t.is_active())
            .any(|t| t.handle_focus_in(doc, target))
    }
}
