//! Client bindings generator.

use loam_codegen::CodeBuilder;
use loam_core::to_camel_case;
use loam_ir::{Operation, ResolvedEntity, ResolvedManifest};

use super::{
    GENERATED_HEADER,
    api_ts::{endpoint, http_method},
};

/// `client/index.ts`: typed calls for every entity route over a
/// caller-supplied fetcher.
pub struct ClientTs<'a> {
    manifest: &'a ResolvedManifest,
}

impl<'a> ClientTs<'a> {
    pub fn new(manifest: &'a ResolvedManifest) -> Self {
        Self { manifest }
    }

    pub fn render(&self) -> String {
        let entities = &self.manifest.entities;

        CodeBuilder::typescript()
            .doc("//", GENERATED_HEADER)
            .blank()
            .each(entities, |b, e| {
                b.line(&format!(
                    "import type {{ {0}, Create{0}Input, Update{0}Input }} from '../api/{1}';",
                    e.name, e.singular
                ))
            })
            .when(!entities.is_empty(), |b| b.blank())
            .line("export type Fetcher = <T>(method: string, path: string, body?: unknown) => Promise<T>;")
            .blank()
            .block_with_close("export function createClient(fetcher: Fetcher) {", "}", |b| {
                b.block_with_close("return {", "};", |b| {
                    b.each(entities, |b, e| {
                        b.block_with_close(
                            &format!("{}: {{", to_camel_case(&e.plural)),
                            "},",
                            |b| b.each(Operation::ALL, |b, op| b.line(&call(e, op))),
                        )
                    })
                })
            })
            .build()
    }
}

fn call(entity: &ResolvedEntity, op: Operation) -> String {
    let name = &entity.name;
    let method = http_method(op);
    let path = endpoint(&entity.endpoints, op);
    let path = if path.contains(":id") {
        format!("`{}`", path.replace(":id", "${id}"))
    } else {
        format!("'{}'", path)
    };

    match op {
        Operation::List => format!("list: () => fetcher<{}[]>('{}', {}),", name, method, path),
        Operation::Get => format!(
            "get: (id: string) => fetcher<{}>('{}', {}),",
            name, method, path
        ),
        Operation::Create => format!(
            "create: (input: Create{0}Input) => fetcher<{0}>('{1}', {2}, input),",
            name, method, path
        ),
        Operation::Update => format!(
            "update: (id: string, input: Update{0}Input) => fetcher<{0}>('{1}', {2}, input),",
            name, method, path
        ),
        Operation::Remove => format!(
            "remove: (id: string) => fetcher<void>('{}', {}),",
            method, path
        ),
    }
}

#[cfg(test)]
mod tests {
    use loam_codegen::resolve;
    use loam_ir::DatabaseConfig;
    use loam_manifest::define::{entity, manifest, text};

    use super::*;

    #[test]
    fn test_client() {
        let m = manifest()
            .database(DatabaseConfig::sqlite("app.db"))
            .entity(entity("BlogPost").field("title", text()))
            .build();
        let resolved = resolve(&m);

        insta::assert_snapshot!(ClientTs::new(&resolved).render(), @r"
        // Generated by loam. Do not edit.

        import type { BlogPost, CreateBlogPostInput, UpdateBlogPostInput } from '../api/blog_post';

        export type Fetcher = <T>(method: string, path: string, body?: unknown) => Promise<T>;

        export function createClient(fetcher: Fetcher) {
          return {
            blogPosts: {
              list: () => fetcher<BlogPost[]>('GET', '/blog-posts'),
              get: (id: string) => fetcher<BlogPost>('GET', `/blog-posts/${id}`),
              create: (input: CreateBlogPostInput) => fetcher<BlogPost>('POST', '/blog-posts', input),
              update: (id: string, input: UpdateBlogPostInput) => fetcher<BlogPost>('PATCH', `/blog-posts/${id}`, input),
              remove: (id: string) => fetcher<void>('DELETE', `/blog-posts/${id}`),
            },
          };
        }
        ");
    }
}
