//! Resource-set count.
//!
//! A resource spec file names objects of the task; a resource is used by a
//! plan iff some action referencing it fires. The output is the number of
//! distinct resources used. Resources no action refers to are dropped.

use crate::encode::StepEncoding;
use crate::features::spec_file;
use crate::smt::{eval_i64, indicator, int, or_all, sum};
use crate::Result;
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;
use z3::ast::{Ast, Bool, Int};
use z3::{Context, Model};

pub struct ResourceCountFeature<'ctx> {
    ctx: &'ctx Context,
    encodings: Vec<Bool<'ctx>>,
    count: Int<'ctx>,
    /// Names of the resources actually tracked.
    pub resources: Vec<String>,
    domain: HashSet<i64>,
}

impl<'ctx> ResourceCountFeature<'ctx> {
    pub fn new(
        encoder: &dyn StepEncoding<'ctx>,
        spec: &Path,
    ) -> Result<ResourceCountFeature<'ctx>> {
        let ctx = encoder.ctx();
        let mut encodings = Vec::new();
        let mut used_vars = Vec::new();
        let mut resources = Vec::new();

        for line in spec_file::parse_path(spec, "resource")? {
            let using = encoder.actions_using_object(&line.name);
            if using.is_empty() {
                debug!("resource {} is not referenced by any action", line.name);
                continue;
            }
            let used = Int::new_const(ctx, format!("ru_{}", line.name));
            encodings.push(used._eq(&indicator(ctx, &or_all(ctx, &using))));
            used_vars.push(used);
            resources.push(line.name);
        }

        let count = Int::new_const(ctx, "ru");
        encodings.push(count._eq(&sum(ctx, &used_vars)));

        Ok(ResourceCountFeature {
            ctx,
            encodings,
            count,
            resources,
            domain: HashSet::new(),
        })
    }

    pub fn name(&self) -> &str {
        "resource-count"
    }

    pub fn assertions(&self) -> &[Bool<'ctx>] {
        &self.encodings
    }

    pub fn behaviour_expr(&mut self, model: &Model<'ctx>) -> Bool<'ctx> {
        let value = eval_i64(model, &self.count);
        self.domain.insert(value);
        self.count._eq(&int(self.ctx, value))
    }

    pub fn reading(&self, model: &Model<'ctx>) -> String {
        format!("ru:{}", eval_i64(model, &self.count))
    }

    pub fn domain_len(&self) -> usize {
        self.domain.len()
    }
}
