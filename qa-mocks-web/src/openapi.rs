//! OpenAPI helpers shared by the services
//!
//! Handler-annotated documents pick up the bearer scheme through
//! [`BearerSecurity`]. Table-driven routers describe themselves with
//! [`DocumentedRoute`] and [`build_document`].

use utoipa::openapi::path::{HttpMethod, OperationBuilder, ParameterBuilder, ParameterIn, PathItem};
use utoipa::openapi::schema::{ObjectBuilder, Schema, Type};
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityRequirement, SecurityScheme};
use utoipa::openapi::{InfoBuilder, OpenApi, OpenApiBuilder, PathsBuilder, RefOr, Required, ResponseBuilder};
use utoipa::Modify;

/// Name of the security scheme every protected operation references
pub const BEARER_SCHEME: &str = "bearer_auth";

/// Registers the HTTP bearer security scheme on a document
pub struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

/// One operation in a route table
#[derive(Clone)]
pub struct DocumentedRoute {
    pub method: HttpMethod,
    /// Path template using `{name}` placeholders
    pub path: String,
    pub summary: String,
    pub tag: String,
    pub protected: bool,
}

/// Path placeholders in declaration order
pub fn path_parameters(path: &str) -> Vec<&str> {
    path.split('/')
        .filter_map(|segment| segment.strip_prefix('{')?.strip_suffix('}'))
        .collect()
}

/// Build a document from a route table
///
/// Operations that share a path are merged into one path item.
pub fn build_document(
    title: &str,
    version: &str,
    description: &str,
    routes: impl IntoIterator<Item = DocumentedRoute>,
) -> OpenApi {
    let mut paths = PathsBuilder::new();

    for route in routes {
        let mut operation = OperationBuilder::new()
            .summary(Some(route.summary.clone()))
            .tags(Some(vec![route.tag.clone()]))
            .response("200", ResponseBuilder::new().description("Success").build())
            .response("400", ResponseBuilder::new().description("Invalid request").build());

        for name in path_parameters(&route.path) {
            operation = operation.parameter(
                ParameterBuilder::new()
                    .name(name)
                    .parameter_in(ParameterIn::Path)
                    .required(Required::True)
                    .schema(Some(RefOr::T(Schema::Object(
                        ObjectBuilder::new().schema_type(Type::String).build(),
                    ))))
                    .build(),
            );
        }

        if route.protected {
            operation = operation
                .response("401", ResponseBuilder::new().description("Missing bearer token").build())
                .security(SecurityRequirement::new(BEARER_SCHEME, Vec::<String>::new()));
        }

        paths = paths.path(route.path.clone(), PathItem::new(route.method.clone(), operation.build()));
    }

    let mut document = OpenApiBuilder::new()
        .info(
            InfoBuilder::new()
                .title(title)
                .version(version)
                .description(Some(description))
                .build(),
        )
        .paths(paths.build())
        .build();

    BearerSecurity.modify(&mut document);
    document
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(method: HttpMethod, path: &str, protected: bool) -> DocumentedRoute {
        DocumentedRoute {
            method,
            path: path.to_string(),
            summary: "test".to_string(),
            tag: "tests".to_string(),
            protected,
        }
    }

    #[test]
    fn test_path_parameters() {
        assert_eq!(path_parameters("/cases/{case_id}/results/{run}"), vec!["case_id", "run"]);
        assert!(path_parameters("/health").is_empty());
    }

    #[test]
    fn test_build_document_merges_methods() {
        let document = build_document(
            "Mock",
            "1.0.0",
            "test document",
            vec![
                route(HttpMethod::Get, "/items/{id}", true),
                route(HttpMethod::Delete, "/items/{id}", true),
                route(HttpMethod::Get, "/health", false),
            ],
        );

        let json = serde_json::to_value(&document).unwrap();
        assert!(json["paths"]["/items/{id}"]["get"].is_object());
        assert!(json["paths"]["/items/{id}"]["delete"].is_object());
        assert_eq!(json["paths"]["/items/{id}"]["get"]["parameters"][0]["name"], "id");
        assert!(json["paths"]["/health"]["get"]["security"].is_null());
        assert!(json["components"]["securitySchemes"][BEARER_SCHEME].is_object());
    }
}
