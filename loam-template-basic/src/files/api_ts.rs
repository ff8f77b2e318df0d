//! API contract generator for one entity.

use loam_codegen::CodeBuilder;
use loam_core::to_camel_case;
use loam_ir::{Operation, ResolvedEntity, ResolvedEndpoints, ResolvedManifest};

use super::GENERATED_HEADER;
use crate::type_mapper::{ts_string, ts_type};

/// `api/<entity>.ts`: the record type, input types, routes and, for
/// externally sourced entities, the remote endpoints.
pub struct ApiTs<'a> {
    entity: &'a ResolvedEntity,
    manifest: &'a ResolvedManifest,
}

impl<'a> ApiTs<'a> {
    pub fn new(entity: &'a ResolvedEntity, manifest: &'a ResolvedManifest) -> Self {
        Self { entity, manifest }
    }

    pub fn render(&self) -> String {
        let entity = self.entity;
        let name = &entity.name;

        let builder = CodeBuilder::typescript()
            .doc("//", GENERATED_HEADER)
            .blank()
            .block_with_close(&format!("export interface {} {{", name), "}", |b| {
                self.record_fields(b)
            })
            .blank()
            .block_with_close(&format!("export interface Create{}Input {{", name), "}", |b| {
                b.each(entity.input_fields(), |b, f| {
                    let optional = !f.required || f.default.is_some();
                    let nullable = if f.required { "" } else { " | null" };
                    b.line(&format!(
                        "{}{}: {}{};",
                        f.name,
                        if optional { "?" } else { "" },
                        ts_type(&f.kind),
                        nullable
                    ))
                })
            })
            .blank()
            .line(&format!(
                "export type Update{}Input = Partial<Create{}Input>;",
                name, name
            ))
            .blank()
            .block_with_close(
                &format!("export const {}Routes = {{", to_camel_case(&entity.singular)),
                "} as const;",
                |b| self.routes(b),
            );

        match &entity.source {
            Some(source) => builder
                .blank()
                .block_with_close(
                    &format!("export const {}Source = {{", to_camel_case(&entity.singular)),
                    "} as const;",
                    |b| {
                        b.line(&format!("baseUrl: {},", ts_string(&source.base_url)))
                            .block_with_close("endpoints: {", "},", |b| {
                                b.each(endpoint_paths(&source.endpoints), |b, (op, path)| {
                                    b.line(&format!("{}: {},", op, ts_string(path)))
                                })
                            })
                    },
                )
                .build(),
            None => builder.build(),
        }
    }

    fn record_fields(&self, b: CodeBuilder) -> CodeBuilder {
        let entity = self.entity;
        let tenancy = &self.manifest.tenancy;

        b.line("id: string;")
            .when(tenancy.enabled, |b| {
                b.line(&format!("{}: string;", tenancy.field))
            })
            .each(&entity.fields, |b, f| {
                if f.is_stored() {
                    let nullable = if f.required { "" } else { " | null" };
                    b.line(&format!("{}: {}{};", f.name, ts_type(&f.kind), nullable))
                } else {
                    b.line(&format!("readonly {}: {};", f.name, ts_type(&f.kind)))
                }
            })
            .each(entity.owned_foreign_keys(), |b, r| {
                b.line(&format!("{}: string | null;", to_camel_case(&r.foreign_key)))
            })
            .when(entity.behaviors.timestamps, |b| {
                b.line("createdAt: string;").line("updatedAt: string;")
            })
            .when(entity.behaviors.soft_delete, |b| {
                b.line("deletedAt: string | null;")
            })
    }

    fn routes(&self, b: CodeBuilder) -> CodeBuilder {
        let protection = self.entity.protection;
        b.each(Operation::ALL, |b, op| {
            let path = endpoint(&self.entity.endpoints, op);
            b.line(&format!(
                "{}: {{ method: '{}', path: {}, auth: {} }},",
                op.as_str(),
                http_method(op),
                ts_string(path),
                protection.requires(op)
            ))
        })
    }
}

pub(crate) fn http_method(op: Operation) -> &'static str {
    match op {
        Operation::List | Operation::Get => "GET",
        Operation::Create => "POST",
        Operation::Update => "PATCH",
        Operation::Remove => "DELETE",
    }
}

pub(crate) fn endpoint(endpoints: &ResolvedEndpoints, op: Operation) -> &str {
    match op {
        Operation::List => &endpoints.list,
        Operation::Get => &endpoints.get,
        Operation::Create => &endpoints.create,
        Operation::Update => &endpoints.update,
        Operation::Remove => &endpoints.remove,
    }
}

fn endpoint_paths(endpoints: &ResolvedEndpoints) -> Vec<(&'static str, &str)> {
    Operation::ALL
        .iter()
        .map(|op| (op.as_str(), endpoint(endpoints, *op)))
        .collect()
}

#[cfg(test)]
mod tests {
    use loam_codegen::resolve;
    use loam_ir::{AuthConfig, Mode, Protection, SourceConfig, TenancyConfig};
    use loam_manifest::define::{computed, entity, enumeration, has_one, manifest, text};

    use super::*;

    #[test]
    fn test_entity_module() {
        let m = manifest()
            .mode(Mode::Headless)
            .auth(AuthConfig::with_providers(["credentials"]))
            .entity(
                entity("BlogPost")
                    .field("title", text())
                    .field("summary", text().optional())
                    .field("status", enumeration(["draft", "live"]).default("draft"))
                    .field("slug", computed(["title"], "slugify(title)"))
                    .relation("author", has_one("User"))
                    .protected(Protection::write())
                    .soft_delete(true),
            )
            .entity(entity("User").field("email", text()))
            .build();
        let resolved = resolve(&m);
        let ts = ApiTs::new(&resolved.entities[0], &resolved).render();

        insta::assert_snapshot!(ts, @r"
        // Generated by loam. Do not edit.

        export interface BlogPost {
          id: string;
          title: string;
          summary: string | null;
          status: 'draft' | 'live';
          readonly slug: unknown;
          authorId: string | null;
          createdAt: string;
          updatedAt: string;
          deletedAt: string | null;
        }

        export interface CreateBlogPostInput {
          title: string;
          summary?: string | null;
          status?: 'draft' | 'live';
        }

        export type UpdateBlogPostInput = Partial<CreateBlogPostInput>;

        export const blogPostRoutes = {
          list: { method: 'GET', path: '/blog-posts', auth: false },
          get: { method: 'GET', path: '/blog-posts/:id', auth: false },
          create: { method: 'POST', path: '/blog-posts', auth: true },
          update: { method: 'PATCH', path: '/blog-posts/:id', auth: true },
          remove: { method: 'DELETE', path: '/blog-posts/:id', auth: true },
        } as const;
        ");
    }

    #[test]
    fn test_sourced_and_tenant_entity() {
        let m = manifest()
            .mode(Mode::ApiOnly)
            .tenancy(TenancyConfig {
                enabled: Some(true),
                field: None,
            })
            .entity(
                entity("Repo")
                    .field("name", text())
                    .source(SourceConfig::new("https://api.example.com"))
                    .timestamps(false),
            )
            .build();
        let resolved = resolve(&m);
        let ts = ApiTs::new(&resolved.entities[0], &resolved).render();

        assert!(ts.contains("export interface Repo {\n  id: string;\n  tenantId: string;\n"));
        assert!(ts.ends_with(
            "export const repoSource = {\n  baseUrl: 'https://api.example.com',\n  endpoints: {\n    \
             list: '/repos',\n    get: '/repos/:id',\n    create: '/repos',\n    \
             update: '/repos/:id',\n    remove: '/repos/:id',\n  },\n} as const;\n"
        ));
    }
}
