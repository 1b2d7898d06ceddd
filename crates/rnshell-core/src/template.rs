//! Built-in source templates and placeholder rendering

pub const APP_TSX: &str = include_str!("../templates/App.tsx");
pub const NATIVE_MODULE_JAVA: &str = include_str!("../templates/NativeModule.java");
pub const NATIVE_PACKAGE_JAVA: &str = include_str!("../templates/NativeModulePackage.java");
pub const DEFAULT_RECIPE: &str = include_str!("../templates/recipe.yaml");

/// Replace `{{KEY}}` placeholders. Unknown placeholders are left as-is, since
/// JSX templates legitimately contain `{{`.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    vars.iter().fold(template.to_string(), |out, (key, value)| {
        out.replace(&format!("{{{{{}}}}}", key), value)
    })
}
