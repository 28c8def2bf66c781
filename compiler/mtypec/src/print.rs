//! Thin diagnostic rendering (spec.md §6.1's display flags). Deliberately
//! not a diagnostics subsystem — the spec places rendering outside scope,
//! so this stays the simplest formatter that satisfies the CLI's flags
//! rather than a design center of its own.

use std::path::Path;

use mtype_ir::StringRegistry;
use mtype_pipeline::{ParseError, Pipeline, PipelineReport};
use mtype_types::{Pool, Substitution, Term, TypeId};

use crate::cli::CliOptions;

pub fn print_report(report: &PipelineReport, pipeline: &Pipeline, opts: &CliOptions) {
    let registry = pipeline.registry();

    if opts.show_visited_external_files {
        for path in &report.visited_files {
            println!("Visited: {}", path.display());
        }
    }

    if opts.show_local_function_types {
        for path in &report.visited_files {
            for name in pipeline.top_level_function_names(path) {
                if let Some(ty) = pipeline.resolved_type_of(path, &name) {
                    let rendered = render_type(pipeline.pool(), pipeline.subst(), registry, ty, opts);
                    println!("{name} :: {rendered}");
                }
            }
        }
    }

    for (ident, _) in &report.unresolved_references {
        let name = registry.at(ident.full_name());
        println!("No file on the search path matched: {name}");
    }

    if opts.show_errors {
        for (path, err) in &report.parse_errors {
            print_parse_error(path, err);
        }
        for err in &report.type_errors {
            println!("type error: {err}");
        }
    }

    if opts.show_diagnostics {
        println!("Num files visited: {}", report.visited_files.len());
        println!("Num parse errors: {}", report.parse_errors.len());
        println!("Num type errors: {}", report.type_errors.len());
        println!("Num unresolved references: {}", report.unresolved_references.len());
    }
}

fn print_parse_error(path: &Path, err: &ParseError) {
    println!("{}: {}", path.display(), err.kind);
}

/// Renders a resolved type term for display. Bounded to a shallow depth —
/// this is a CLI convenience, not the canonical pretty-printer spec.md
/// leaves unspecified, so it never needs to handle every cyclic shape the
/// pool can hold.
fn render_type(pool: &Pool, subst: &Substitution, registry: &StringRegistry, ty: TypeId, opts: &CliOptions) -> String {
    render_depth(pool, subst, registry, ty, opts, 0)
}

fn render_depth(pool: &Pool, subst: &Substitution, registry: &StringRegistry, ty: TypeId, opts: &CliOptions, depth: u32) -> String {
    if depth > 8 {
        return "...".to_string();
    }
    let ty = subst.resolve(ty);
    match pool.get(ty) {
        Term::Variable { name } => match name {
            Some(name) => format!("'{}", registry.at(*name)),
            None => "'_".to_string(),
        },
        Term::Scalar { name, args } if args.is_empty() => registry.at(*name).to_string(),
        Term::Scalar { name, args } => {
            let rendered: Vec<String> = args.iter().map(|a| render_depth(pool, subst, registry, *a, opts, depth + 1)).collect();
            format!("{}<{}>", registry.at(*name), rendered.join(", "))
        }
        Term::Tuple { elements } => {
            let rendered: Vec<String> = elements.iter().map(|e| render_depth(pool, subst, registry, *e, opts, depth + 1)).collect();
            format!("({})", rendered.join(", "))
        }
        Term::DestructuredTuple { members, .. } => {
            let rendered: Vec<String> = members.iter().map(|e| render_depth(pool, subst, registry, *e, opts, depth + 1)).collect();
            if opts.show_explicit_destructured_tuples {
                format!("dt({})", rendered.join(", "))
            } else {
                format!("({})", rendered.join(", "))
            }
        }
        Term::List { elements } => {
            let rendered: Vec<String> = elements.iter().map(|e| render_depth(pool, subst, registry, *e, opts, depth + 1)).collect();
            format!("[{}]", rendered.join(", "))
        }
        Term::Union { members } => {
            let rendered: Vec<String> = members.iter().map(|e| render_depth(pool, subst, registry, *e, opts, depth + 1)).collect();
            rendered.join(" | ")
        }
        Term::Abstraction { inputs, outputs, .. } => {
            let in_s = render_depth(pool, subst, registry, *inputs, opts, depth + 1);
            let out_s = render_depth(pool, subst, registry, *outputs, opts, depth + 1);
            if opts.use_arrow_function_notation {
                format!("{in_s} -> {out_s}")
            } else {
                format!("{out_s} = {in_s}")
            }
        }
        Term::Scheme { body, .. } => format!("forall. {}", render_depth(pool, subst, registry, *body, opts, depth + 1)),
        Term::Alias { name, target } if opts.show_explicit_aliases => {
            format!("{}={}", registry.at(*name), render_depth(pool, subst, registry, *target, opts, depth + 1))
        }
        Term::Alias { name, .. } => registry.at(*name).to_string(),
        Term::Record { fields } => {
            let rendered: Vec<String> = fields
                .iter()
                .map(|f| format!("{}: {}", registry.at(f.name.id()), render_depth(pool, subst, registry, f.value, opts, depth + 1)))
                .collect();
            format!("{{{}}}", rendered.join(", "))
        }
        Term::Class { name, .. } => registry.at(*name).to_string(),
        Term::Application { .. } => "<application>".to_string(),
        Term::Parameters { .. } => "<params>".to_string(),
        Term::ConstantValue { value } => format!("{value:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mtype_pipeline::SearchPath;

    #[test]
    fn an_empty_report_prints_without_panicking() {
        let report = PipelineReport::default();
        let pipeline = Pipeline::new(SearchPath::default());
        let opts = CliOptions::default();
        print_report(&report, &pipeline, &opts);
    }
}
