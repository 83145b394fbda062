pub mod models;
pub mod service;

#[cfg(test)]
mod tests;

pub use models::{CreateTaskRequest, Priority, Task, TaskStatus};
pub use service::{TaskService, TasksApi};
