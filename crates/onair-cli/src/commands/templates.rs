//! List, show and copy templates.

use clap::Args;
use onair_config::{
    TemplateFile, ensure_user_templates_dir, factory_template_toml, factory_templates,
    get_factory_template, list_user_templates, template_name_from_path, user_templates_dir,
};

#[derive(Args)]
pub struct TemplatesArgs {
    /// Print the TOML of a factory template
    #[arg(long, conflicts_with = "copy")]
    show: Option<String>,

    /// Copy a factory template into the user templates directory
    #[arg(long)]
    copy: Option<String>,

    /// Name for the copied template (defaults to the factory name)
    #[arg(long, requires = "copy")]
    name: Option<String>,
}

pub fn run(args: TemplatesArgs) -> anyhow::Result<()> {
    if let Some(name) = args.show {
        let Some(toml) = factory_template_toml(&name) else {
            anyhow::bail!("Factory template '{}' not found.", name);
        };
        print!("{toml}");
        return Ok(());
    }

    if let Some(source) = args.copy {
        return copy_template(&source, args.name.as_deref());
    }

    println!("Factory Templates:");
    println!("==================");
    for file in factory_templates() {
        let desc = file.description.as_deref().unwrap_or("");
        println!("  {:20} - {}", file.name, desc);
    }
    println!();

    println!("User Templates ({}):", user_templates_dir().display());
    println!("===============");
    let user = list_user_templates();
    if user.is_empty() {
        println!("  (none)");
    }
    for path in user {
        let name = template_name_from_path(&path).unwrap_or_else(|| "unknown".to_string());
        match TemplateFile::load(&path) {
            Ok(file) => println!("  {:20} - {}", name, file.description.as_deref().unwrap_or("")),
            Err(_) => println!("  {:20} - (error loading)", name),
        }
    }
    Ok(())
}

fn copy_template(source: &str, new_name: Option<&str>) -> anyhow::Result<()> {
    let mut file = get_factory_template(source)
        .ok_or_else(|| anyhow::anyhow!("Factory template '{}' not found.", source))?;
    let target_name = new_name.unwrap_or(source);

    let dir = ensure_user_templates_dir()?;
    let path = dir.join(format!("{target_name}.toml"));
    if path.exists() {
        anyhow::bail!(
            "Template '{}' already exists in user templates. Choose a different name with --name.",
            target_name
        );
    }

    file.name = target_name.to_string();
    file.save(&path)?;
    println!("Copied '{}' to {}", source, path.display());
    Ok(())
}
