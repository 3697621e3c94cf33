//! Todo List
//!
//! Two task slots, each up to 14 characters, persisted in flash. The list
//! logic is plain data so both the shell's `todo` command and the
//! standalone demo share it.

use defmt::Format;
use heapless::{String, Vec};
use sequential_storage::map::{SerializationError, Value};

use crate::cprintln;
use crate::shell::console::Console;
use crate::system::storage::{self, take_str, StorageKey};

/// Number of task slots
pub const SLOT_COUNT: usize = 2;

/// Longest task text
pub const TASK_MAX: usize = 14;

/// Errors from list operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub enum TodoError {
    /// Both slots taken
    Full,
    /// No task at that position
    BadIndex,
    /// Text empty or longer than [`TASK_MAX`]
    BadText,
}

/// One task
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoItem {
    pub text: String<TASK_MAX>,
    pub done: bool,
}

/// The task list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoList {
    pub items: Vec<TodoItem, SLOT_COUNT>,
}

impl TodoList {
    /// Adds a task to the first free slot.
    pub fn add(&mut self, text: &str) -> Result<(), TodoError> {
        if text.is_empty() || text.len() > TASK_MAX {
            return Err(TodoError::BadText);
        }
        let mut item = TodoItem::default();
        let _ = item.text.push_str(text);
        self.items.push(item).map_err(|_| TodoError::Full)
    }

    /// Marks the task at `index` (zero-based) done.
    pub fn mark_done(&mut self, index: usize) -> Result<(), TodoError> {
        let item = self.items.get_mut(index).ok_or(TodoError::BadIndex)?;
        item.done = true;
        Ok(())
    }

    /// Removes the task at `index`; later tasks shift down.
    pub fn remove(&mut self, index: usize) -> Result<(), TodoError> {
        if index >= self.items.len() {
            return Err(TodoError::BadIndex);
        }
        self.items.remove(index);
        Ok(())
    }
}

impl Value<'_> for TodoList {
    fn serialize_into(&self, buffer: &mut [u8]) -> Result<usize, SerializationError> {
        let needed = 1 + self.items.iter().map(|i| 2 + i.text.len()).sum::<usize>();
        if buffer.len() < needed {
            return Err(SerializationError::BufferTooSmall);
        }
        buffer[0] = self.items.len() as u8;
        let mut at = 1;
        for item in &self.items {
            buffer[at] = item.done as u8;
            buffer[at + 1] = item.text.len() as u8;
            at += 2;
            buffer[at..at + item.text.len()].copy_from_slice(item.text.as_bytes());
            at += item.text.len();
        }
        Ok(at)
    }

    fn deserialize_from(buffer: &[u8]) -> Result<Self, SerializationError>
    where
        Self: Sized,
    {
        let count = *buffer.first().ok_or(SerializationError::BufferTooSmall)? as usize;
        if count > SLOT_COUNT {
            return Err(SerializationError::InvalidFormat);
        }
        let mut list = TodoList::default();
        let mut at = 1;
        for _ in 0..count {
            let done = *buffer.get(at).ok_or(SerializationError::BufferTooSmall)? != 0;
            let text = take_str::<TASK_MAX>(buffer, at + 1)?;
            at += 2 + text.len();
            let _ = list.items.push(TodoItem { text, done });
        }
        Ok(list)
    }
}

/// Loads the list from flash, empty if nothing is stored yet.
pub async fn load() -> TodoList {
    storage::fetch::<TodoList>(StorageKey::Todos)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// Persists the list.
pub async fn save(list: &TodoList) -> Result<(), storage::StorageError> {
    storage::store(StorageKey::Todos, list).await
}

async fn show(console: &mut Console, list: &TodoList) {
    if list.items.is_empty() {
        cprintln!(console, "nothing to do");
        return;
    }
    for (i, item) in list.items.iter().enumerate() {
        let mark = if item.done { 'x' } else { ' ' };
        cprintln!(console, "  {}. [{}] {}", i + 1, mark, item.text);
    }
}

/// Interactive menu over the console.
pub async fn run_menu(console: &mut Console) {
    let mut list = load().await;
    loop {
        cprintln!(console);
        show(console, &list).await;
        cprintln!(console, "[1] list  [2] add  [3] done  [4] delete  [0] exit");
        console.print(format_args!("todo> ")).await;
        let choice: String<8> = console.read_line(false).await;

        match choice.as_str() {
            "1" => {}
            "2" => {
                console.print(format_args!("task ({} chars max): ", TASK_MAX)).await;
                let text: String<TASK_MAX> = console.read_line(false).await;
                match list.add(&text) {
                    Ok(()) => persist(console, &list).await,
                    Err(TodoError::Full) => {
                        cprintln!(console, "both slots taken; delete one first")
                    }
                    Err(_) => cprintln!(console, "nothing added"),
                }
            }
            "3" => {
                if let Some(index) = ask_index(console).await {
                    match list.mark_done(index) {
                        Ok(()) => persist(console, &list).await,
                        Err(_) => cprintln!(console, "no task there"),
                    }
                }
            }
            "4" => {
                if let Some(index) = ask_index(console).await {
                    match list.remove(index) {
                        Ok(()) => persist(console, &list).await,
                        Err(_) => cprintln!(console, "no task there"),
                    }
                }
            }
            "0" | "" => return,
            other => cprintln!(console, "{}: not an option", other),
        }
    }
}

async fn ask_index(console: &mut Console) -> Option<usize> {
    console.print(format_args!("which task (1-{})? ", SLOT_COUNT)).await;
    let line: String<8> = console.read_line(false).await;
    match line.trim().parse::<usize>() {
        Ok(n) if n >= 1 => Some(n - 1),
        _ => {
            cprintln!(console, "not a task number");
            None
        }
    }
}

async fn persist(console: &mut Console, list: &TodoList) {
    if save(list).await.is_err() {
        cprintln!(console, "warning: could not save to flash");
    }
}
