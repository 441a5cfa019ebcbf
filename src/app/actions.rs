#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Resize,
    ToggleHelp,

    ListUp,
    ListDown,
    GoTop,
    GoBottom,

    PlaySelected,
    TogglePause,
    PlayNext,
    PlayPrev,
    ShufflePick,
    VolumeUp,
    VolumeDown,
    ToggleMute,
    SeekForward,
    SeekBack,
    Retry,

    QueueRemoveSelected,
    QueueClear,
    ToggleLoop,
}
