//! Hook file scaffold.

use loam_codegen::CodeBuilder;
use loam_core::to_camel_case;
use loam_ir::ResolvedEntity;

/// Marks a hook file as scaffolded; after the first run the file belongs to
/// the user and is never regenerated.
pub const HOOK_HEADER: &str = "Scaffolded by loam. This file is yours to edit.";

/// `hooks/<entity>.ts`: lifecycle hooks around an entity's writes.
pub struct HookTs<'a> {
    entity: &'a ResolvedEntity,
}

impl<'a> HookTs<'a> {
    pub fn new(entity: &'a ResolvedEntity) -> Self {
        Self { entity }
    }

    pub fn render(&self) -> String {
        let name = &self.entity.name;

        CodeBuilder::typescript()
            .doc("//", HOOK_HEADER)
            .blank()
            .line(&format!(
                "import type {{ {0}, Create{0}Input, Update{0}Input }} from '../api/{1}';",
                name, self.entity.singular
            ))
            .blank()
            .block_with_close(
                &format!("export const {}Hooks = {{", to_camel_case(&self.entity.singular)),
                "};",
                |b| {
                    b.block_with_close(
                        &format!(
                            "async beforeCreate(input: Create{0}Input): Promise<Create{0}Input> {{",
                            name
                        ),
                        "},",
                        |b| b.line("return input;"),
                    )
                    .block_with_close(
                        &format!(
                            "async beforeUpdate(id: string, input: Update{0}Input): Promise<Update{0}Input> {{",
                            name
                        ),
                        "},",
                        |b| b.line("return input;"),
                    )
                    .line(&format!(
                        "async afterWrite(record: {}): Promise<void> {{}},",
                        name
                    ))
                },
            )
            .build()
    }
}
