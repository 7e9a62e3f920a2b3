// Task-Modul: Enthält alle Embassy Tasks
//
// Jeder Task läuft asynchron und unabhängig.
// Tasks kommunizieren über Embassy Channels (Taster/Rad → Steuer-Task).

pub mod button;
pub mod control;
pub mod wheel;

// Re-export Tasks für einfachen Import
pub use button::button_task;
pub use control::control_task;
pub use wheel::wheel_task;
