use super::model::{CreateTodoRequest, ListQuery, UpdateTodoRequest};
use super::service::TodoService;
use axum::http::{HeaderName, HeaderValue};
use routewire::prelude::*;

pub struct TodoController {
    service: Arc<TodoService>,
}

impl TodoController {
    pub fn new(service: Arc<TodoService>) -> Self {
        Self { service }
    }

    async fn create(self: Arc<Self>, args: Arguments) -> Result<Reply, RouteError> {
        let request: CreateTodoRequest = args.body()?;
        let todo = self.service.create(request).await;
        if let Some(response) = args.response() {
            let location = HeaderValue::from_str(&format!("/todos/{}", todo.id))
                .map_err(RouteError::handler)?;
            response.insert_header(HeaderName::from_static("location"), location);
        }
        HttpResponse::with(StatusCode::CREATED, &todo).map(Reply::from)
    }

    async fn list(self: Arc<Self>, args: Arguments) -> Result<Reply, RouteError> {
        let query: ListQuery = match args.query() {
            Some(query) => query.deserialize()?,
            None => ListQuery::default(),
        };
        Reply::json(&self.service.list(query.done).await)
    }

    async fn get_one(self: Arc<Self>, args: Arguments) -> Result<Reply, RouteError> {
        let id = todo_id(&args)?;
        match self.service.get(id).await {
            Some(todo) => Reply::json(&todo),
            None => Err(RouteError::not_found(format!("Todo {id} not found"))),
        }
    }

    async fn update(self: Arc<Self>, args: Arguments) -> Result<Reply, RouteError> {
        let id = todo_id(&args)?;
        let request: UpdateTodoRequest = args.body()?;
        match self.service.update(id, request).await {
            Some(todo) => Reply::json(&todo),
            None => Err(RouteError::not_found(format!("Todo {id} not found"))),
        }
    }

    async fn remove(self: Arc<Self>, args: Arguments) -> Result<Reply, RouteError> {
        let id = todo_id(&args)?;
        if self.service.remove(id).await {
            Ok(HttpResponse::no_content().into())
        } else {
            if let Some(next) = args.next() {
                next.error(RouteError::not_found(format!("Todo {id} not found")));
            }
            Ok(Reply::from(serde_json::Value::Null))
        }
    }
}

fn todo_id(args: &Arguments) -> Result<u64, RouteError> {
    args.params()
        .ok_or_else(|| RouteError::bad_request("missing path params"))?
        .parse("id")
}

fn id_schema() -> ValidationSchema {
    ValidationSchema::new().params(json!({
        "type": "object",
        "required": ["id"],
        "properties": { "id": { "type": "string", "pattern": "^[0-9]+$" } }
    }))
}

impl Controller for TodoController {
    fn register(store: &mut MetadataStore) -> routewire::Result<()> {
        store
            .register_class::<Self>(ClassMetadata::new("/todos").middleware(Arc::new(RequestLogger)))
            .register_method(
                MethodMetadata::post("create", "/", Self::create)
                    .validate(Validation::new(ValidationSchema::new().body(json!({
                        "type": "object",
                        "required": ["title"],
                        "properties": { "title": { "type": "string", "minLength": 1 } }
                    }))))
                    .bind(ParamKind::Body, 0),
            )
            .register_method(
                MethodMetadata::get("list", "/", Self::list).bind(ParamKind::Query, 0),
            )
            .register_method(
                MethodMetadata::get("get_one", "/:id", Self::get_one)
                    .validate(Validation::new(id_schema()))
                    .bind(ParamKind::Params, 0),
            )
            .register_method(
                MethodMetadata::patch("update", "/:id", Self::update)
                    .validate(Validation::new(id_schema().body(json!({
                        "type": "object",
                        "properties": {
                            "title": { "type": "string", "minLength": 1 },
                            "done": { "type": "boolean" }
                        },
                        "additionalProperties": false
                    }))))
                    .bind(ParamKind::Params, 0)
                    .bind(ParamKind::Body, 1),
            )
            .register_method(
                MethodMetadata::delete("remove", "/:id", Self::remove).bind(ParamKind::Params, 0),
            );
        Ok(())
    }
}
