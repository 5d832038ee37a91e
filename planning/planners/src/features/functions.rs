//! Function-box discretisation of numeric fluents.
//!
//! A function spec file names integer fluents with a `[MIN, MAX]` range and
//! a box width DELTA. The fluent's last-state value is mapped to the index
//! of the half-open box containing it (the last box is right-closed), one
//! integer output per resolved fluent. Unknown fluent names are skipped; at
//! least one must resolve.

use crate::encode::StepEncoding;
use crate::features::spec_file;
use crate::smt::{and_all, eval_i64, int};
use crate::{Error, Result};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;
use z3::ast::{Ast, Bool, Int};
use z3::{Context, Model};

pub struct FunctionBoxFeature<'ctx> {
    ctx: &'ctx Context,
    encodings: Vec<Bool<'ctx>>,
    /// `(fluent name, box index variable)` per resolved function.
    boxes: Vec<(String, Int<'ctx>)>,
    domain: HashSet<String>,
}

impl<'ctx> FunctionBoxFeature<'ctx> {
    pub fn new(encoder: &dyn StepEncoding<'ctx>, spec: &Path) -> Result<FunctionBoxFeature<'ctx>> {
        let ctx = encoder.ctx();
        let task = encoder.task().clone();
        let h = encoder.horizon();
        let mut encodings = Vec::new();
        let mut boxes = Vec::new();

        for line in spec_file::parse_path(spec, "function")? {
            let Some(id) = task.num_fluent_id(&line.name) else {
                debug!("function {} does not name a task fluent", line.name);
                continue;
            };
            if line.delta <= 0 || line.max <= line.min || line.delta > line.max - line.min {
                return Err(Error::Config(format!(
                    "invalid box layout for {}: [{}, {}] with width {}",
                    line.name, line.min, line.max, line.delta
                )));
            }
            let value = encoder.num_fluent_at(id, h);
            let var = Int::new_const(ctx, format!("box_{}", line.name));

            let mut idx: i64 = 0;
            let mut lo = line.min;
            while lo < line.max - line.delta {
                let within = Bool::and(
                    ctx,
                    &[&value.ge(&int(ctx, lo)), &value.lt(&int(ctx, lo + line.delta))],
                );
                encodings.push(within._eq(&var._eq(&int(ctx, idx))));
                idx += 1;
                lo += line.delta;
            }
            // last box is closed on the right
            let within = Bool::and(
                ctx,
                &[
                    &value.ge(&int(ctx, line.max - line.delta)),
                    &value.le(&int(ctx, line.max)),
                ],
            );
            encodings.push(within._eq(&var._eq(&int(ctx, idx))));
            encodings.push(var.ge(&int(ctx, 0)));
            encodings.push(var.le(&int(ctx, idx)));

            boxes.push((line.name, var));
        }

        if boxes.is_empty() {
            return Err(Error::Config(
                "no function in the spec file matches a task fluent".to_string(),
            ));
        }
        Ok(FunctionBoxFeature {
            ctx,
            encodings,
            boxes,
            domain: HashSet::new(),
        })
    }

    pub fn name(&self) -> &str {
        "function-box"
    }

    pub fn assertions(&self) -> &[Bool<'ctx>] {
        &self.encodings
    }

    fn rendering(&self, model: &Model<'ctx>) -> String {
        self.boxes
            .iter()
            .map(|(name, var)| format!("{name}={}", eval_i64(model, var)))
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn behaviour_expr(&mut self, model: &Model<'ctx>) -> Bool<'ctx> {
        self.domain.insert(self.rendering(model));
        let equalities: Vec<Bool> = self
            .boxes
            .iter()
            .map(|(_, var)| var._eq(&int(self.ctx, eval_i64(model, var))))
            .collect();
        and_all(self.ctx, &equalities)
    }

    pub fn reading(&self, model: &Model<'ctx>) -> String {
        format!("fn:{}", self.rendering(model))
    }

    pub fn domain_len(&self) -> usize {
        self.domain.len()
    }
}
