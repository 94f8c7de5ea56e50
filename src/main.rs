//! Example server wiring services, controllers and middleware.

use std::sync::Arc;
use tinyrest::binding::DynHandler;
use tinyrest::prelude::*;
use tracing_subscriber::EnvFilter;

/// Greeting service shared by both controllers.
struct GreetingService {
    message: String,
}

impl Service for GreetingService {
    fn init(&mut self) -> Result<(), ServiceError> {
        self.message = "Hello, world!".to_string();
        tracing::info!("GreetingService initialized");
        Ok(())
    }
}

#[derive(Debug, Default, serde::Deserialize)]
struct UserFilter {
    name: Option<String>,
    gender: Option<String>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct User {
    name: String,
    age: u32,
}

struct UserController {
    greetings: Arc<GreetingService>,
}

impl Controller for UserController {
    fn endpoints(self: Arc<Self>) -> Endpoints {
        let mut endpoints = Endpoints::new();
        endpoints.base_path("/user");
        endpoints.middleware(logging_middleware());

        let greetings = self.greetings.clone();
        endpoints.get("/:id", move |mut args| {
            let greetings = greetings.clone();
            async move {
                let id: i64 = args.path_param()?;
                let filter: UserFilter = args.filter()?;
                Ok(ResponseBuilder::ok(serde_json::json!({
                    "id": id,
                    "filter_name": filter.name,
                    "filter_gender": filter.gender,
                    "greeting": greetings.message,
                })))
            }
        });

        // Echoes the decoded body back inside the envelope.
        endpoints.post("/", |mut args| async move {
            let user: User = args.body()?;
            Ok(ResponseBuilder::ok(user).header("Hello", "World"))
        });

        endpoints.delete("/:id", |mut args| async move {
            let id: i64 = args.path_param()?;
            Ok(ResponseBuilder::no_content(format!("user {id} deleted")))
        });

        endpoints
    }
}

/// Gzip-enabled controller demonstrating table-level compression.
struct ReportController {
    greetings: Arc<GreetingService>,
}

impl Controller for ReportController {
    fn endpoints(self: Arc<Self>) -> Endpoints {
        let mut endpoints = Endpoints::new();
        endpoints.base_path("/report");
        endpoints.gzip(true);

        let greetings = self.greetings.clone();
        endpoints.get("/", move |_args| {
            let greetings = greetings.clone();
            async move {
                Ok(ResponseBuilder::ok(serde_json::json!({
                    "report": greetings.message,
                })))
            }
        });

        endpoints
    }
}

fn logging_middleware() -> Middleware {
    struct Logging {
        next: DynHandler,
    }

    #[async_trait]
    impl Handler for Logging {
        async fn handle(&self, args: Args) -> BindResult<ResponseBuilder> {
            tracing::info!("request entering user endpoints");
            let resp = self.next.handle(args).await;
            tracing::info!("request leaving user endpoints");
            resp
        }
    }

    Arc::new(|next: DynHandler| Arc::new(Logging { next }) as DynHandler)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("Starting tinyrest example server...");

    let mut app = App::new(AppConfig::new().host("0.0.0.0").port(8080));

    let greetings = app.services().install(GreetingService {
        message: String::new(),
    })?;

    app.controller(Arc::new(UserController {
        greetings: greetings.clone(),
    }));
    app.controller(Arc::new(ReportController { greetings }));

    tracing::info!("Try: curl http://localhost:8080/user/42?name=X");
    tracing::info!("Try: curl -X POST -d '{{\"name\":\"A\",\"age\":20}}' http://localhost:8080/user");
    tracing::info!("Try: curl --compressed http://localhost:8080/report");

    app.run().await
}
