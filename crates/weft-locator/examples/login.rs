//! Console demo: resolve a woven interface and watch the call logger.
//!
//! Run with `cargo run -p weft-locator --example login`.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use weft_aspects::CallLogger;
use weft_engine::{
    arg, target_facade, AspectBinding, AspectLifetime, CallValue, Contract, InterfaceDecl,
    MethodDecl, Woven,
};
use weft_locator::ServiceLocator;

trait Access: Send + Sync {
    fn login(&self, name: &str, pw: &str);
}

struct MemoryAccess;

impl Access for MemoryAccess {
    fn login(&self, _name: &str, _pw: &str) {}
}

struct WovenAccess {
    woven: Woven,
}

impl Access for WovenAccess {
    fn login(&self, name: &str, pw: &str) {
        self.woven
            .invoke(
                "login",
                &[
                    CallValue::of(name.to_string()),
                    CallValue::of(pw.to_string()),
                ],
            )
            .expect("login dispatch");
    }
}

struct AccessContract;

impl Contract for AccessContract {
    type Facade = Arc<dyn Access>;

    fn declare() -> InterfaceDecl {
        InterfaceDecl::new::<Arc<dyn Access>>("Access").method(
            MethodDecl::new("login", &["name", "pw"], |target, args| {
                let access: &Arc<dyn Access> = target_facade(target, "Access")?;
                let name = arg::<String>(args, 0, "Access.login")?;
                let pw = arg::<String>(args, 1, "Access.login")?;
                access.login(name, pw);
                Ok(CallValue::void())
            })
            .void()
            .bind(AspectBinding::prolog::<CallLogger>(AspectLifetime::PerCall)),
        )
    }

    fn facade(woven: Woven) -> Arc<dyn Access> {
        Arc::new(WovenAccess { woven })
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let locator = ServiceLocator::new();
    locator.register::<AccessContract>("MemoryAccess", || Arc::new(MemoryAccess));

    let access = locator
        .instance::<AccessContract>()
        .expect("resolve Access");
    access.login("testuser", "secret");
}
