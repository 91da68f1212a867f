use keymap::KeyMap;

#[derive(KeyMap, Clone, Copy, Debug, PartialEq)]
pub enum Action {
    /// Quit the application
    #[key("q")]
    Quit,
    /// Reset the machine to the program's initial tape
    #[key("r")]
    Reset,
    /// Advance the machine by one step
    #[key("space")]
    Step,
    /// Start running, or pause a run in progress
    #[key("p")]
    ToggleRun,
    /// Switch between normal and full speed
    #[key("f")]
    ToggleSpeed,
    /// Toggle help display
    #[key("h")]
    ToggleHelp,
    /// Load the previous program
    #[key("left")]
    PreviousProgram,
    /// Load the next program
    #[key("right")]
    NextProgram,
}
