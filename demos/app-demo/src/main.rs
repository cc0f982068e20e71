use sprig_core::prelude::*;

mod services {
    use sprig_core::prelude::*;
    use sprig_core_macros::Component;

    /// 数据库连接配置
    #[derive(Component, Default, Debug)]
    pub struct DatabaseService {
        #[inject(property = "database.host")]
        host: Option<String>,

        #[inject(property = "database.port")]
        port: Option<u16>,

        #[inject(property = "database.max-connections")]
        max_connections: Option<u32>,
    }

    impl DatabaseService {
        pub fn endpoint(&self) -> String {
            format!(
                "{}:{}",
                self.host.as_deref().unwrap_or("localhost"),
                self.port.unwrap_or(5432)
            )
        }

        pub fn query(&self, sql: &str) -> String {
            format!(
                "Query result for: {} (pool size {})",
                sql,
                self.max_connections.unwrap_or(1)
            )
        }
    }

    #[derive(Component)]
    #[component(constructor = ServerService::create)]
    pub struct ServerService {
        started_at: std::time::Instant,

        #[inject]
        db: Option<Shared<DatabaseService>>,

        #[inject(property = "server.host")]
        host: Option<String>,

        #[inject(property = "server.port")]
        port: Option<u16>,

        #[inject(property = "server.workers")]
        workers: Option<usize>,

        #[inject(property = "server.banner")]
        banner: Option<String>,
    }

    impl ServerService {
        fn create() -> anyhow::Result<Self> {
            Ok(Self {
                started_at: std::time::Instant::now(),
                db: None,
                host: None,
                port: None,
                workers: None,
                banner: None,
            })
        }

        pub fn start(&self) -> anyhow::Result<()> {
            let db = self
                .db
                .as_ref()
                .ok_or_else(|| anyhow!("database service was not injected"))?;

            println!("🚀 Starting server...");
            println!("   Host: {}", self.host.as_deref().unwrap_or("127.0.0.1"));
            println!("   Port: {}", self.port.unwrap_or(8080));
            println!("   Workers: {}", self.workers.unwrap_or(1));
            if let Some(banner) = &self.banner {
                println!("   Banner: {}", banner);
            }
            println!("📊 Connecting to database: {}", db.read().endpoint());
            println!(
                "✅ Server is running ({}µs after construction)",
                self.started_at.elapsed().as_micros()
            );
            Ok(())
        }

        pub fn handle_request(&self, path: &str) -> anyhow::Result<()> {
            let db = self.db.as_ref().context("database service was not injected")?;
            println!("\n🔧 Handling request: {}", path);
            println!("   Response: {}", db.read().query("SELECT * FROM users"));
            Ok(())
        }
    }

    /// 不声明任何注入点，因此不会被容器创建
    #[derive(Component, Default)]
    pub struct CommonService;
}

fn find_file(candidates: &[&'static str]) -> &'static str {
    candidates
        .iter()
        .copied()
        .find(|path| std::path::Path::new(path).exists())
        .unwrap_or(candidates[candidates.len() - 1])
}

fn main() -> anyhow::Result<()> {
    println!("\n╔════════════════════════════════════════════════════╗");
    println!("║         Sprig Container - Complete Demo            ║");
    println!("╚════════════════════════════════════════════════════╝\n");

    let properties = find_file(&["demos/app-demo/application.properties", "application.properties"]);
    let toml = find_file(&["demos/app-demo/application.toml", "application.toml"]);

    let context = SprigApplication::new("SprigDemo")
        .namespace("app_demo::services")
        .property_file(properties)
        .property_file(toml)
        .initializer(|ctx| {
            tracing::info!("Configuration keys: {}", ctx.configuration().len());
            Ok(())
        })
        .run()?;

    let server = context
        .get_component::<services::ServerService>()
        .context("ServerService was not created")?;
    server.read().start()?;
    server.read().handle_request("/api/users")?;

    println!("\n📦 Components:");
    for name in context.get_component_names() {
        println!("   {}", name);
    }
    println!(
        "   CommonService created: {}",
        context.get_component::<services::CommonService>().is_some()
    );

    println!("\n💡 Try these commands:");
    println!("   LOG_LEVEL=debug cargo run -p app-demo");
    println!("   LOG_FORMAT=json cargo run -p app-demo");
    println!();

    Ok(())
}
