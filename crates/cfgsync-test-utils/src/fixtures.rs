//! Sample configuration variants in the window manager's RON layout.

/// A complete variant with all three tracked sections.
pub const DESKTOP: &str = r#"#![enable(implicit_some)]
(
    modkey: "Mod4",
    mousekey: "Mod4",
    tags: [
        "1",
        "2",
        "3",
        "4",
    ],
    max_window_width: None,
    layouts: [
        MainAndVertStack,
        Monocle,
    ],
    layout_mode: Tag,
    window_rules: [
        (window_class: "Steam", spawn_floating: true),
        (window_title: "Picture-in-Picture", spawn_sticky: true),
    ],
    keybind: [
        (command: Execute, value: "alacritty", modifier: ["modkey"], key: "Return"),
        (command: CloseWindow, modifier: ["modkey", "Shift"], key: "q"),
        (command: SoftReload, modifier: ["modkey", "Shift"], key: "r"),
    ],
    disable_current_tag_swap: false,
)
"#;

/// A variant with stale sections and its own unrelated settings.
pub const LAPTOP: &str = r#"#![enable(implicit_some)]
(
    modkey: "Mod1",
    mousekey: "Mod1",
    tags: [
        "web",
        "code",
    ],
    max_window_width: Some(1920),
    layouts: [
        Monocle,
    ],
    layout_mode: Workspace,
    window_rules: [
    ],
    keybind: [
        (command: Execute, value: "xterm", modifier: ["modkey"], key: "Return"),
    ],
    disable_current_tag_swap: true,
)
"#;

/// A variant without `window_rules`.
pub const MINIMAL: &str = r#"(
    modkey: "Mod4",
    tags: [
        "main",
    ],
    keybind: [
    ],
)
"#;

/// A variant whose `tags` section is never closed.
pub const BROKEN: &str = r#"(
    modkey: "Mod4",
    keybind: [
    ],
    tags: [
        "1",
)
"#;

/// [`LAPTOP`] with `\r\n` line endings.
pub fn laptop_crlf() -> String {
    LAPTOP.replace('\n', "\r\n")
}
