/// Raw page events, as delivered by the embedding layer's DOM listeners.
/// The detector never touches the DOM itself; it only sees these.
#[derive(Debug, Clone)]
pub enum DomEvent {
    /// An input event. `value` is the current text of the event target and
    /// `editable` whether the target is a text control or explicitly marked
    /// editable. Non-editable targets never update the buffer.
    Input { value: String, editable: bool },

    /// A key press. `key` uses DOM key names ("Enter", "Shift", ...).
    KeyDown { key: String, shift_key: bool },

    /// IME composition started; buffer updates pause until it ends.
    CompositionStart,
    CompositionEnd,

    /// A click (or equivalent activation) on a button-like element.
    /// `label` is its accessible label or visible text; `has_icon` whether
    /// it carries a vector-icon child.
    Click { label: String, has_icon: bool },

    /// An element inserted anywhere in the page subtree, with its rendered
    /// text content.
    NodeInserted { text: String },
}

/// Semantic signals the detector distills out of the raw event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    /// The user submitted whatever was in the input buffer.
    PromptSubmitted { content: String },

    /// A response finished streaming (insertion burst went quiet).
    ResponseAppeared { content: String },
}
