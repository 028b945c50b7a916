use crate::commands::{print_json, Context};
use crate::error::invalid_input;
use anyhow::Result;
use clap::{Args, Subcommand};
use kinfolk_core::domain::normalize_relationship;

#[derive(Debug, Subcommand)]
pub enum RelationshipCommand {
    /// Known relationship types
    Ls,
    Add(AddRelationshipArgs),
}

#[derive(Debug, Args)]
pub struct AddRelationshipArgs {
    pub name: String,
}

pub fn list_relationships(ctx: &Context<'_>) -> Result<()> {
    if ctx.json {
        return print_json(&ctx.config.relationship_types);
    }
    for relationship in &ctx.config.relationship_types {
        println!("{relationship}");
    }
    Ok(())
}

pub fn add_relationship(ctx: &Context<'_>, args: AddRelationshipArgs) -> Result<()> {
    let normalized = normalize_relationship(&args.name);
    if normalized.is_empty() {
        return Err(invalid_input("relationship cannot be empty"));
    }
    let added = ctx.remember_relationship(&normalized)?;
    if ctx.json {
        print_json(&normalized)?;
    } else if added.is_some() {
        println!("added {normalized}");
    } else {
        println!("{normalized} already known");
    }
    Ok(())
}
