pub mod renderer;

pub use renderer::{AgentPanel, Cell, DuelView, Renderer, cell_at};
