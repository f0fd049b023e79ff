//! Tool Router - builds the rmcp ToolRouter from a registry.
//!
//! The stdio transport is served by rmcp, which dispatches through its own
//! `ToolRouter`. Each registered handler becomes one dynamic route, so rmcp
//! and the HTTP/SSE dispatchers run exactly the same tool code.

use futures::FutureExt;
use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute, ToolRouter},
};

use super::ToolRegistry;

/// Build the tool router with every tool of `registry`.
pub fn build_tool_router<S>(registry: &ToolRegistry) -> ToolRouter<S>
where
    S: Send + Sync + 'static,
{
    registry
        .handlers()
        .fold(ToolRouter::new(), |router, handler| {
            let handler = handler.clone();
            router.with_route(ToolRoute::new_dyn(
                handler.descriptor(),
                move |ctx: ToolCallContext<'_, S>| {
                    let args = ctx.arguments.clone().unwrap_or_default();
                    let handler = handler.clone();
                    async move { handler.call(args).await.map_err(McpError::from) }.boxed()
                },
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ToolsConfig;

    struct TestServer {}

    fn test_registry() -> ToolRegistry {
        ToolRegistry::with_builtin_tools(&ToolsConfig::default()).unwrap()
    }

    #[test]
    fn test_build_router() {
        let router: ToolRouter<TestServer> = build_tool_router(&test_registry());
        let tools = router.list_all();
        assert_eq!(tools.len(), 2);

        let names: Vec<_> = tools.iter().map(|t| t.name.as_ref()).collect();
        assert!(names.contains(&"helloWorld"));
        assert!(names.contains(&"godoc"));
    }

    #[test]
    fn test_registry_matches_router() {
        // Ensure registry and router have the same tools
        let registry = test_registry();
        let registry_names = registry.tool_names();

        let router: ToolRouter<TestServer> = build_tool_router(&registry);
        let router_tools = router.list_all();
        let router_names: Vec<_> = router_tools.iter().map(|t| t.name.as_ref()).collect();

        assert_eq!(registry_names.len(), router_names.len());
        for name in registry_names {
            assert!(router_names.contains(&name));
        }
    }

    #[test]
    fn test_single_tool_router() {
        let hello = test_registry().single("helloWorld").unwrap();
        let router: ToolRouter<TestServer> = build_tool_router(&hello);
        let tools = router.list_all();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "helloWorld");
    }
}
