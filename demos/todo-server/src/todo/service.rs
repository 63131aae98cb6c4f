use super::model::{CreateTodoRequest, Todo, UpdateTodoRequest};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

#[derive(Default)]
pub struct TodoService {
    todos: RwLock<BTreeMap<u64, Todo>>,
    next_id: AtomicU64,
}

impl TodoService {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, request: CreateTodoRequest) -> Todo {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let todo = Todo {
            id,
            title: request.title,
            done: false,
        };
        self.todos.write().await.insert(id, todo.clone());
        todo
    }

    pub async fn list(&self, done: Option<bool>) -> Vec<Todo> {
        self.todos
            .read()
            .await
            .values()
            .filter(|todo| done.is_none_or(|done| todo.done == done))
            .cloned()
            .collect()
    }

    pub async fn get(&self, id: u64) -> Option<Todo> {
        self.todos.read().await.get(&id).cloned()
    }

    pub async fn update(&self, id: u64, request: UpdateTodoRequest) -> Option<Todo> {
        let mut todos = self.todos.write().await;
        let todo = todos.get_mut(&id)?;
        if let Some(title) = request.title {
            todo.title = title;
        }
        if let Some(done) = request.done {
            todo.done = done;
        }
        Some(todo.clone())
    }

    pub async fn remove(&self, id: u64) -> bool {
        self.todos.write().await.remove(&id).is_some()
    }
}
