// Actions the TUI can perform. Keys map to these; the app executes them.

/// What the UI is currently doing; decides which key mappings apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppMode {
    /// Moving around the list / grid / table
    Browse,
    /// Typing into the search box
    Search,
    /// Looking at one item
    Detail,
    /// Creating or editing an item
    Form,
    /// Waiting for y/n on a delete
    ConfirmDelete,
    Help,
    Debug,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigateAction {
    Up(usize),
    Down(usize),
    Left(usize),
    Right(usize),
    PageUp,
    PageDown,
    Home,
    End,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Navigate(NavigateAction),

    // Header cursor and sort (table view)
    HeaderCursorLeft,
    HeaderCursorRight,
    PressHeader,

    // Row actions
    OpenSelected,
    EditSelected,
    DeleteSelected,
    CreateItem,

    // Query controls
    StartSearch,
    CycleSort,
    CycleStatusFilter,
    CycleViewMode,
    Refresh,

    // Preferences
    CycleTheme,
    CycleTint,
    ToggleLanguage,

    // Forms and prompts
    NextField,
    PreviousField,
    Submit,
    Confirm,
    Cancel,

    ShowHelp,
    ShowDebugInfo,
    ExitCurrentMode,
    Quit,
    ForceQuit,
}
