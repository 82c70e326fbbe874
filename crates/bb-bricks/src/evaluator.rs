//! Hooke law evaluation shared by the stress potential variants.
//!
//! [`HookeEvaluator`] resolves the elastic options of a brick, makes the
//! declarations they imply and emits the stress and operator code blocks.
//! Variants plug in their stiffness degradation through [`Degradation`].

use bb_behaviour::{
    Attribute, BehaviourDescription, BehaviourDsl, BehaviourError, CodeBlock, CodeBlockKind,
    ElasticSymmetry, IntegrationScheme, LocalDataStructure, SupportedType, TEMPERATURE, THETA,
    TypeFlag, VariableCategory, VariableDescription,
};
use bb_core::{Lame, Real, ensure_positive, pa, unitless};
use bb_tensor::{ScalarExpr, Statement, Stensor4Expr, StensorExpr, Symbol};
use tracing::debug;
use uom::si::pressure::pascal;

use crate::degradation::Degradation;
use crate::derivatives::StressDerivativeEntry;
use crate::error::{BrickError, BrickResult};
use crate::implicit::{self, JacobianMode};
use crate::options::{
    GENERIC_PREDICTION_OPERATOR, GENERIC_TANGENT_OPERATOR, OptionReader, PLANE_STRESS_SUPPORT,
    POISSON_RATIO, STIFFNESS_TENSOR_STORAGE, StiffnessStorage, THERMAL_EXPANSION,
    THERMAL_EXPANSION_REFERENCE_TEMPERATURE, YOUNG_MODULUS,
};
use crate::state::{Hook, LifecycleTracker};

pub const ELASTIC_STRAIN: &str = "eel";
pub const TOTAL_STRAIN_INCREMENT: &str = "deto";
pub const STRESS: &str = "sig";
pub const STIFFNESS: &str = "D";
pub const LAMBDA: &str = "lambda";
pub const MU: &str = "mu";
pub const TANGENT_OPERATOR: &str = "Dt";
pub const AXIAL_STRAIN: &str = "etozz";
pub const DEGRADATION_FACTOR: &str = "omega_d";
pub const LAMBDA_END_OF_STEP: &str = "lambda_ets";
pub const MU_END_OF_STEP: &str = "mu_ets";
const LAMBDA_BEGINNING_OF_STEP: &str = "lambda_bts";
const MU_BEGINNING_OF_STEP: &str = "mu_bts";
const THERMAL_STRAIN_INCREMENT: &str = "dets";
const INVERSE_JACOBIAN_EEL: &str = "iJ_eel_eel";

/// Names the stress potential declares or writes in generated code.
pub const RESERVED_NAMES: [&str; 15] = [
    ELASTIC_STRAIN,
    TOTAL_STRAIN_INCREMENT,
    STRESS,
    STIFFNESS,
    TANGENT_OPERATOR,
    LAMBDA,
    MU,
    AXIAL_STRAIN,
    DEGRADATION_FACTOR,
    LAMBDA_END_OF_STEP,
    MU_END_OF_STEP,
    LAMBDA_BEGINNING_OF_STEP,
    MU_BEGINNING_OF_STEP,
    THERMAL_STRAIN_INCREMENT,
    INVERSE_JACOBIAN_EEL,
];

const ELASTIC_BRANCH: &str = "if ((smt == ELASTIC) || (smt == SECANTOPERATOR)) {";

/// Name of the increment of `name`.
pub fn increment(name: &str) -> String {
    format!("d{name}")
}

/// Point of the time step at which a quantity is evaluated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    BeginningOfStep,
    /// `x + theta * dx`
    MidStep,
    /// External state variables are `x + dx`; integration variables are
    /// already updated.
    EndOfStep,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ElasticRepresentation {
    /// Isotropic elasticity through the Lamé coefficients.
    Lame {
        young: ScalarExpr,
        poisson: ScalarExpr,
    },
    /// Stiffness tensor `D` supplied by the calling solver.
    StiffnessTensor,
}

impl ElasticRepresentation {
    pub fn name(&self) -> &'static str {
        match self {
            ElasticRepresentation::Lame { .. } => "lame",
            ElasticRepresentation::StiffnessTensor => "stiffness_tensor",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ThermalExpansion {
    pub coefficient: ScalarExpr,
    pub reference_temperature: Real,
}

/// Which stress hook produced the stress blocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StressPath {
    StiffnessTensor,
    Isotropic,
}

/// Elastic stiffness in one of its two symbolic forms.
#[derive(Clone, Debug, PartialEq)]
enum Stiffness {
    Tensor(Stensor4Expr),
    Lame(ScalarExpr, ScalarExpr),
}

impl Stiffness {
    /// `C : e`; the Lamé form is expanded to `lambda tr(e) I + 2 mu e`.
    fn apply(&self, e: StensorExpr) -> StensorExpr {
        match self {
            Stiffness::Tensor(c) => c.clone() * e,
            Stiffness::Lame(lambda, mu) => {
                lambda.clone() * ScalarExpr::trace(e.clone()) * StensorExpr::Identity
                    + (ScalarExpr::Const(2.0) * mu.clone()) * e
            }
        }
    }

    fn tensor(&self) -> Stensor4Expr {
        match self {
            Stiffness::Tensor(c) => c.clone(),
            Stiffness::Lame(lambda, mu) => Stensor4Expr::isotropic(lambda.clone(), mu.clone()),
        }
    }
}

/// `(lambda, mu)` of Young modulus `e` and Poisson ratio `nu`.
pub fn lame_coefficients(e: &ScalarExpr, nu: &ScalarExpr) -> (ScalarExpr, ScalarExpr) {
    if let (ScalarExpr::Const(e), ScalarExpr::Const(nu)) = (e, nu) {
        let lame = Lame::from_young_poisson(pa(*e), unitless(*nu));
        return (
            ScalarExpr::Const(lame.lambda.get::<pascal>()),
            ScalarExpr::Const(lame.mu.get::<pascal>()),
        );
    }
    let one = ScalarExpr::one;
    let two = || ScalarExpr::Const(2.0);
    let lambda = ScalarExpr::div(
        e.clone() * nu.clone(),
        (one() + nu.clone()) * (one() - two() * nu.clone()),
    );
    let mu = ScalarExpr::div(e.clone(), two() * (one() + nu.clone()));
    (lambda, mu)
}

/// Resolved configuration of the Hooke part of a brick.
#[derive(Clone, Debug, PartialEq)]
pub struct HookeConfiguration {
    pub representation: ElasticRepresentation,
    pub storage: StiffnessStorage,
    /// Whether an elastic property changes during the step.
    pub field_dependent: bool,
    /// State variables the elastic properties depend on, in declaration order.
    pub state_dependencies: Vec<String>,
    pub thermal_expansion: Option<ThermalExpansion>,
    pub plane_stress: bool,
    pub generic_tangent_operator: bool,
    pub generic_prediction_operator: bool,
    pub degradation: Degradation,
    implicit: bool,
    evolving: Vec<(String, VariableCategory)>,
}

impl HookeConfiguration {
    /// Weight of increments in mid-step quantities: `theta` for implicit
    /// schemes, zero otherwise.
    pub fn weight(&self) -> ScalarExpr {
        if self.implicit {
            ScalarExpr::member(THETA)
        } else {
            ScalarExpr::zero()
        }
    }

    /// `expr` with every quantity evolving during the step taken at `stage`.
    pub fn at_stage(&self, expr: &ScalarExpr, stage: Stage) -> ScalarExpr {
        let mut out = expr.clone();
        for (name, category) in &self.evolving {
            let x = ScalarExpr::member(name.as_str());
            let dx = ScalarExpr::member(increment(name));
            let by = match (stage, category) {
                (Stage::BeginningOfStep, _) => continue,
                (Stage::MidStep, _) => x + self.weight() * dx,
                (Stage::EndOfStep, VariableCategory::ExternalStateVariable) => x + dx,
                (Stage::EndOfStep, _) => continue,
            };
            out = out.substitute_scalar(name, &by);
        }
        out
    }

    /// Lamé coefficients at `stage`, `None` for the stiffness tensor form.
    pub fn lame(&self, stage: Stage) -> Option<(ScalarExpr, ScalarExpr)> {
        match &self.representation {
            ElasticRepresentation::Lame { young, poisson } => Some(lame_coefficients(
                &self.at_stage(young, stage),
                &self.at_stage(poisson, stage),
            )),
            ElasticRepresentation::StiffnessTensor => None,
        }
    }

    fn member_stiffness(&self) -> Stiffness {
        match self.representation {
            ElasticRepresentation::Lame { .. } => {
                Stiffness::Lame(ScalarExpr::member(LAMBDA), ScalarExpr::member(MU))
            }
            ElasticRepresentation::StiffnessTensor => {
                Stiffness::Tensor(Stensor4Expr::member(STIFFNESS))
            }
        }
    }

    fn mid_step(&self, name: &str) -> StensorExpr {
        StensorExpr::member(name) + self.weight() * StensorExpr::member(increment(name))
    }

    fn degradation_factor(&self, stage: Stage) -> ScalarExpr {
        self.degradation.factor(stage, &self.weight())
    }

    /// Mid-step stress in terms of the stiffness members, the expression the
    /// Jacobian entries are derived from.
    pub fn mid_step_stress(&self) -> StensorExpr {
        self.degradation_factor(Stage::MidStep)
            * (self.member_stiffness().tensor() * self.mid_step(ELASTIC_STRAIN))
    }

    /// Mid-step stress with field dependent elastic properties expanded, so
    /// that it can be re-evaluated for perturbed increments.
    pub fn explicit_mid_step_stress(&self) -> StensorExpr {
        let stiffness = match self.lame(Stage::MidStep) {
            Some((lambda, mu)) if self.field_dependent => Stiffness::Lame(lambda, mu),
            _ => self.member_stiffness(),
        };
        self.degradation_factor(Stage::MidStep)
            * (stiffness.tensor() * self.mid_step(ELASTIC_STRAIN))
    }

    /// `alpha(T + dT) (T + dT - Tref) - alpha(T) (T - Tref)`
    pub fn thermal_strain_increment(&self) -> Option<ScalarExpr> {
        let th = self.thermal_expansion.as_ref()?;
        let t = ScalarExpr::member(TEMPERATURE);
        let dt = ScalarExpr::member(increment(TEMPERATURE));
        let tref = ScalarExpr::Const(th.reference_temperature);
        let alpha_ets = self.at_stage(&th.coefficient, Stage::EndOfStep);
        let alpha_bts = self.at_stage(&th.coefficient, Stage::BeginningOfStep);
        Some(alpha_ets * (t.clone() + dt - tref.clone()) - alpha_bts * (t - tref))
    }

    /// Beginning-of-step stiffness; field dependent coefficients are
    /// defined in `block` first.
    fn beginning_of_step_stiffness(&self, block: &mut CodeBlock) -> Stiffness {
        match self.lame(Stage::BeginningOfStep) {
            Some((lambda, mu)) if self.field_dependent => {
                block.push(Statement::define(LAMBDA_BEGINNING_OF_STEP, lambda));
                block.push(Statement::define(MU_BEGINNING_OF_STEP, mu));
                Stiffness::Lame(
                    ScalarExpr::local(LAMBDA_BEGINNING_OF_STEP),
                    ScalarExpr::local(MU_BEGINNING_OF_STEP),
                )
            }
            _ => self.member_stiffness(),
        }
    }

    /// `sig = omega * (C : e)`; with `scratch` the damage factor is stored
    /// in the `omega_d` local data first.
    fn degraded_stress(
        &self,
        stage: Stage,
        stiffness: &Stiffness,
        e: StensorExpr,
        scratch: bool,
    ) -> Vec<Statement> {
        let sig = Symbol::member(STRESS);
        match self.degradation {
            Degradation::Isotropic { .. } if !scratch => vec![Statement::set(
                sig,
                self.degradation_factor(stage) * stiffness.apply(e),
            )],
            Degradation::None => vec![Statement::set(sig, stiffness.apply(e))],
            Degradation::Isotropic { .. } => vec![
                Statement::set(Symbol::local(DEGRADATION_FACTOR), self.degradation_factor(stage)),
                Statement::set(
                    sig,
                    ScalarExpr::local(DEGRADATION_FACTOR) * stiffness.apply(e),
                ),
            ],
        }
    }

    fn integrator_block(&self, origin: &str) -> CodeBlock {
        let feel = Symbol::member(format!("f{ELASTIC_STRAIN}"));
        let mut block = CodeBlock::new(origin).with(Statement::sub_assign(
            feel.clone(),
            StensorExpr::member(TOTAL_STRAIN_INCREMENT),
        ));
        if let Some(dets) = self.thermal_strain_increment() {
            block.push(Statement::define(THERMAL_STRAIN_INCREMENT, dets));
            block.push(Statement::add_assign(
                feel,
                ScalarExpr::local(THERMAL_STRAIN_INCREMENT) * StensorExpr::Identity,
            ));
        }
        if self.plane_stress
            && let ElasticRepresentation::Lame { young, .. } = &self.representation
        {
            let young = self.at_stage(young, Stage::MidStep);
            block.push(Statement::raw("if (hypothesis == ModellingHypothesis::PLANESTRESS) {"));
            block.push(Statement::raw(format!(
                "  this->f{ELASTIC_STRAIN}(2) -= this->{};",
                increment(AXIAL_STRAIN)
            )));
            block.push(Statement::raw(format!(
                "  this->f{AXIAL_STRAIN} = this->{STRESS}(2) / ({young});"
            )));
            block.push(Statement::raw("}"));
        }
        block
    }
}

fn resolve_representation(
    bd: &BehaviourDescription,
    dsl: &dyn BehaviourDsl,
    reader: &OptionReader<'_>,
    already_configured: bool,
    storage: StiffnessStorage,
) -> BrickResult<ElasticRepresentation> {
    let declared = bd.elastic_material_properties().filter(|_| already_configured);
    let (young, poisson) = match declared {
        Some((e, nu)) => (Some(ScalarExpr::member(e)), Some(ScalarExpr::member(nu))),
        None => {
            let resolve = |name: &str| -> BrickResult<Option<ScalarExpr>> {
                match reader.material_property(name)? {
                    Some(p) => Ok(Some(dsl.resolve_material_property(bd, name, &p)?)),
                    None => Ok(None),
                }
            };
            (resolve(YOUNG_MODULUS)?, resolve(POISSON_RATIO)?)
        }
    };

    match (young, poisson) {
        (Some(young), Some(poisson)) => {
            if let ScalarExpr::Const(e) = &young {
                ensure_positive(*e, "Young modulus")
                    .map_err(|err| BrickError::configuration(YOUNG_MODULUS, err.to_string()))?;
            }
            if let ScalarExpr::Const(nu) = &poisson
                && !(*nu > -1.0 && *nu < 0.5)
            {
                return Err(BrickError::configuration(
                    POISSON_RATIO,
                    format!("expected a value in (-1, 0.5), got {nu}"),
                ));
            }
            if bd.elastic_symmetry() == ElasticSymmetry::Orthotropic {
                return Err(BrickError::configuration(
                    YOUNG_MODULUS,
                    "isotropic elastic properties given for an orthotropic behaviour",
                ));
            }
            Ok(ElasticRepresentation::Lame { young, poisson })
        }
        (Some(_), None) => Err(BrickError::configuration(
            POISSON_RATIO,
            "must be given together with young_modulus",
        )),
        (None, Some(_)) => Err(BrickError::configuration(
            YOUNG_MODULUS,
            "must be given together with poisson_ratio",
        )),
        (None, None) if storage == StiffnessStorage::Constant => {
            Ok(ElasticRepresentation::StiffnessTensor)
        }
        (None, None) => Err(BrickError::configuration(
            YOUNG_MODULUS,
            "missing required option; a solver supplied stiffness tensor needs \
             stiffness_tensor_storage: constant",
        )),
    }
}

/// Quantities evolving during the step referenced by `exprs`.
fn evolving_symbols(
    bd: &BehaviourDescription,
    exprs: &[&ScalarExpr],
) -> Vec<(String, VariableCategory)> {
    let mut out: Vec<(String, VariableCategory)> = Vec::new();
    for expr in exprs {
        for name in expr.symbols() {
            if let Some((category, _)) = bd.variable(&name)
                && category.evolves_during_step()
                && !out.iter().any(|(n, _)| *n == name)
            {
                out.push((name, category));
            }
        }
    }
    out
}

/// Fails when `name` exists with another category or type.
fn check_reusable(
    bd: &BehaviourDescription,
    category: VariableCategory,
    type_: SupportedType,
    name: &str,
) -> BrickResult<()> {
    match bd.variable(name) {
        Some((c, v)) if c != category || v.type_ != type_ => {
            Err(BehaviourError::DuplicateVariable { name: name.to_string() }.into())
        }
        _ => Ok(()),
    }
}

/// Fails when `set_attribute` would reject any of `attributes`.
pub(crate) fn check_attributes(
    bd: &BehaviourDescription,
    attributes: &[(&str, Attribute)],
) -> BrickResult<()> {
    for (name, requested) in attributes {
        if let Some(existing) = bd.attribute(name)
            && existing != requested
        {
            return Err(BehaviourError::AttributeConflict {
                name: name.to_string(),
                existing: existing.to_string(),
                requested: requested.to_string(),
            }
            .into());
        }
    }
    Ok(())
}

fn declare_if_absent(
    bd: &mut BehaviourDescription,
    category: VariableCategory,
    variable: VariableDescription,
) -> BrickResult<()> {
    if let Some((c, v)) = bd.variable(&variable.name)
        && c == category
        && v.type_ == variable.type_
    {
        return Ok(());
    }
    bd.declare(category, variable)?;
    Ok(())
}

/// Hooke evaluation helper with its call sequencing.
#[derive(Debug)]
pub struct HookeEvaluator {
    origin: &'static str,
    tracker: LifecycleTracker,
    config: Option<HookeConfiguration>,
    stress_path: Option<StressPath>,
}

impl HookeEvaluator {
    /// `origin` names the owning brick in generated blocks.
    pub fn new(origin: &'static str) -> Self {
        Self {
            origin,
            tracker: LifecycleTracker::new(),
            config: None,
            stress_path: None,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.tracker.is_initialized()
    }

    pub fn check_not_initialized(&self) -> BrickResult<()> {
        self.tracker.check_not_initialized()
    }

    pub fn configuration(&self) -> Option<&HookeConfiguration> {
        self.config.as_ref()
    }

    pub fn stress_path(&self) -> Option<StressPath> {
        self.stress_path
    }

    fn config(&self) -> BrickResult<&HookeConfiguration> {
        self.config
            .as_ref()
            .ok_or_else(|| BrickError::state("brick is not initialized"))
    }

    /// Resolve the validated options, declare the variables they imply and
    /// emit the initialization and integrator blocks.
    pub fn initialize(
        &mut self,
        bd: &mut BehaviourDescription,
        dsl: &dyn BehaviourDsl,
        reader: &OptionReader<'_>,
        already_configured: bool,
        degradation: Degradation,
    ) -> BrickResult<()> {
        self.tracker.check_not_initialized()?;

        let storage = reader.storage()?;
        let representation = resolve_representation(bd, dsl, reader, already_configured, storage)?;

        let thermal_expansion = match reader.material_property(THERMAL_EXPANSION)? {
            Some(p) => {
                let coefficient = dsl.resolve_material_property(bd, THERMAL_EXPANSION, &p)?;
                let reference_temperature = ensure_positive(
                    reader.real(THERMAL_EXPANSION_REFERENCE_TEMPERATURE)?,
                    "reference temperature",
                )
                .map_err(|e| {
                    BrickError::configuration(
                        THERMAL_EXPANSION_REFERENCE_TEMPERATURE,
                        e.to_string(),
                    )
                })?;
                Some(ThermalExpansion {
                    coefficient,
                    reference_temperature,
                })
            }
            None => None,
        };

        let (field_dependent, state_dependencies, evolving) = match &representation {
            ElasticRepresentation::Lame { young, poisson } => {
                let both = young.clone() + poisson.clone();
                let mut exprs = vec![young, poisson];
                if let Some(th) = &thermal_expansion {
                    exprs.push(&th.coefficient);
                }
                (
                    bd.is_field_dependent(&both),
                    bd.state_dependencies(&both),
                    evolving_symbols(bd, &exprs),
                )
            }
            ElasticRepresentation::StiffnessTensor => (
                false,
                Vec::new(),
                thermal_expansion
                    .as_ref()
                    .map(|th| evolving_symbols(bd, &[&th.coefficient]))
                    .unwrap_or_default(),
            ),
        };
        if storage == StiffnessStorage::Constant && field_dependent {
            return Err(BrickError::configuration(
                STIFFNESS_TENSOR_STORAGE,
                "constant storage requested but the elastic properties evolve during the step",
            ));
        }

        let mut plane_stress = reader.boolean(PLANE_STRESS_SUPPORT)?;
        if plane_stress {
            if representation == ElasticRepresentation::StiffnessTensor {
                return Err(BrickError::configuration(
                    PLANE_STRESS_SUPPORT,
                    "requires young_modulus and poisson_ratio",
                ));
            }
            if !bd.has_plane_stress_hypothesis() {
                dsl.warning(&format!(
                    "{PLANE_STRESS_SUPPORT} ignored: behaviour '{}' supports no plane stress hypothesis",
                    bd.name()
                ));
                plane_stress = false;
            }
        }

        let config = HookeConfiguration {
            representation,
            storage,
            field_dependent,
            state_dependencies,
            thermal_expansion,
            plane_stress,
            generic_tangent_operator: reader.boolean(GENERIC_TANGENT_OPERATOR)?,
            generic_prediction_operator: reader.boolean(GENERIC_PREDICTION_OPERATOR)?,
            degradation,
            implicit: bd.integration_scheme() == IntegrationScheme::Implicit,
            evolving,
        };

        self.check_declarations(bd, &config)?;
        self.declare(bd, &config)?;

        if let Some((lambda, mu)) = config.lame(Stage::BeginningOfStep)
            && !config.field_dependent
        {
            bd.append_code_block(
                CodeBlockKind::InitializeLocalVariables,
                CodeBlock::new(self.origin)
                    .with(Statement::set(Symbol::member(LAMBDA), lambda))
                    .with(Statement::set(Symbol::member(MU), mu)),
            );
        }
        bd.append_code_block(CodeBlockKind::Integrator, config.integrator_block(self.origin));

        debug!(
            brick = self.origin,
            behaviour = bd.name(),
            representation = config.representation.name(),
            storage = config.storage.name(),
            field_dependent = config.field_dependent,
            state_dependencies = ?config.state_dependencies,
            thermal_expansion = config.thermal_expansion.is_some(),
            plane_stress = config.plane_stress,
            damage = ?config.degradation.variable(),
            "resolved stress potential configuration"
        );

        self.config = Some(config);
        self.tracker.mark_initialized();
        Ok(())
    }

    fn attributes(&self, config: &HookeConfiguration) -> Vec<(&'static str, Attribute)> {
        let mut attributes = Vec::new();
        if config.representation == ElasticRepresentation::StiffnessTensor {
            attributes.push(("requires_stiffness_tensor", true.into()));
        }
        if config.plane_stress {
            attributes.push((PLANE_STRESS_SUPPORT, true.into()));
        }
        attributes.push(("stress_potential", self.origin.into()));
        attributes.push(("elastic_representation", config.representation.name().into()));
        attributes.push((STIFFNESS_TENSOR_STORAGE, config.storage.name().into()));
        if config.thermal_expansion.is_some() {
            attributes.push((THERMAL_EXPANSION, true.into()));
        }
        attributes
    }

    /// Every clash `declare` could hit, checked before `bd` is touched.
    fn check_declarations(
        &self,
        bd: &BehaviourDescription,
        config: &HookeConfiguration,
    ) -> BrickResult<()> {
        check_reusable(
            bd,
            VariableCategory::StateVariable,
            SupportedType::StrainStensor,
            ELASTIC_STRAIN,
        )?;
        config.degradation.check(bd)?;
        let mut fresh = Vec::new();
        match config.representation {
            ElasticRepresentation::Lame { .. } => fresh.extend([LAMBDA, MU]),
            ElasticRepresentation::StiffnessTensor => check_reusable(
                bd,
                VariableCategory::LocalVariable,
                SupportedType::StiffnessTensor,
                STIFFNESS,
            )?,
        }
        if config.plane_stress {
            fresh.push(AXIAL_STRAIN);
        }
        if let Some(name) = fresh.into_iter().find(|name| bd.variable(name).is_some()) {
            return Err(BehaviourError::DuplicateVariable { name: name.to_string() }.into());
        }
        check_attributes(bd, &self.attributes(config))
    }

    fn declare(
        &self,
        bd: &mut BehaviourDescription,
        config: &HookeConfiguration,
    ) -> BrickResult<()> {
        declare_if_absent(
            bd,
            VariableCategory::StateVariable,
            VariableDescription::new(SupportedType::StrainStensor, ELASTIC_STRAIN)
                .with_entry_name("ElasticStrain")
                .with_description("elastic strain"),
        )?;
        config.degradation.declare(bd, self.origin)?;

        match config.representation {
            ElasticRepresentation::Lame { .. } => {
                bd.declare(
                    VariableCategory::LocalVariable,
                    VariableDescription::new(SupportedType::Stress, LAMBDA)
                        .with_description("first Lamé coefficient"),
                )?;
                bd.declare(
                    VariableCategory::LocalVariable,
                    VariableDescription::new(SupportedType::Stress, MU)
                        .with_description("shear modulus"),
                )?;
            }
            ElasticRepresentation::StiffnessTensor => {
                declare_if_absent(
                    bd,
                    VariableCategory::LocalVariable,
                    VariableDescription::new(SupportedType::StiffnessTensor, STIFFNESS)
                        .with_description("stiffness tensor supplied by the solver"),
                )?;
            }
        }
        if config.plane_stress {
            bd.declare(
                VariableCategory::StateVariable,
                VariableDescription::new(SupportedType::Strain, AXIAL_STRAIN)
                    .with_entry_name("AxialStrain")
                    .with_description("axial strain under plane stress"),
            )?;
        }
        for (name, value) in self.attributes(config) {
            bd.set_attribute(name, value)?;
        }
        Ok(())
    }

    // -- queries -------------------------------------------------------------

    /// Derivatives of the mid-step stress with respect to the increments of
    /// the integration variables: `eel`, the damage variable, then every
    /// state variable an elastic property depends on.
    pub fn stress_derivatives(
        &self,
        bd: &BehaviourDescription,
    ) -> BrickResult<Vec<StressDerivativeEntry>> {
        self.tracker.require_initialized("stress_derivatives")?;
        let config = self.config()?;
        let sigma = config.mid_step_stress();

        // chain rule through the Lamé coefficients
        let through_properties = |x: &str| -> BrickResult<StensorExpr> {
            if !config.state_dependencies.iter().any(|s| s == x) {
                return Ok(StensorExpr::Zero);
            }
            let Some((lambda, mu)) = config.lame(Stage::MidStep) else {
                return Ok(StensorExpr::Zero);
            };
            let dx = increment(x);
            Ok(lambda.d_scalar(&dx)? * sigma.d_scalar(LAMBDA)?
                + mu.d_scalar(&dx)? * sigma.d_scalar(MU)?)
        };

        let mut entries = vec![StressDerivativeEntry::new(
            ELASTIC_STRAIN,
            sigma.d_stensor(&increment(ELASTIC_STRAIN))?,
            TypeFlag::Stensor,
        )];
        let damage = config.degradation.variable();
        if let Some(d) = damage {
            entries.push(StressDerivativeEntry::new(
                d,
                sigma.d_scalar(&increment(d))? + through_properties(d)?,
                TypeFlag::Scalar,
            ));
        }
        for x in &config.state_dependencies {
            if Some(x.as_str()) == damage {
                continue;
            }
            let flag = bd
                .variable(x)
                .and_then(|(_, v)| v.type_.flag())
                .unwrap_or(TypeFlag::Scalar);
            entries.push(StressDerivativeEntry::new(x, through_properties(x)?, flag));
        }
        Ok(entries)
    }

    pub fn generate_implicit_equation_derivatives(
        &self,
        bd: &BehaviourDescription,
        equation: &str,
        variable: &str,
        placeholder: &str,
        mode: JacobianMode,
    ) -> BrickResult<String> {
        self.tracker
            .require_initialized("generate_implicit_equation_derivatives")?;
        let entries = self.stress_derivatives(bd)?;
        let stress = self.config()?.explicit_mid_step_stress();
        implicit::equation_derivative(bd, &entries, &stress, equation, variable, placeholder, mode)
    }

    // -- hooks ---------------------------------------------------------------

    pub fn declare_elastic_prediction(&mut self, bd: &mut BehaviourDescription) -> BrickResult<()> {
        self.tracker.check_hook(Hook::ElasticPrediction)?;
        let config = self.config()?;
        let mut block = CodeBlock::new(self.origin);
        let stiffness = config.beginning_of_step_stiffness(&mut block);
        let mut strain =
            StensorExpr::member(ELASTIC_STRAIN) + StensorExpr::member(TOTAL_STRAIN_INCREMENT);
        if let Some(dets) = config.thermal_strain_increment() {
            block.push(Statement::define(THERMAL_STRAIN_INCREMENT, dets));
            strain = strain - ScalarExpr::local(THERMAL_STRAIN_INCREMENT) * StensorExpr::Identity;
        }
        block.push(Statement::set(
            Symbol::member(STRESS),
            config.degradation_factor(Stage::BeginningOfStep) * stiffness.apply(strain),
        ));
        bd.append_code_block(CodeBlockKind::ComputeElasticPrediction, block);
        self.tracker.complete(Hook::ElasticPrediction);
        Ok(())
    }

    /// Stress through the constant stiffness tensor `D`.
    pub fn declare_stress_with_stiffness_tensor(
        &mut self,
        bd: &mut BehaviourDescription,
    ) -> BrickResult<()> {
        self.tracker.check_hook(Hook::StressWithStiffnessTensor)?;
        let config = self.config()?;
        if config.storage != StiffnessStorage::Constant {
            return Err(BrickError::configuration(
                STIFFNESS_TENSOR_STORAGE,
                "the stiffness tensor stress computation requires constant storage",
            ));
        }
        if let ElasticRepresentation::Lame { .. } = config.representation {
            declare_if_absent(
                bd,
                VariableCategory::LocalVariable,
                VariableDescription::new(SupportedType::StiffnessTensor, STIFFNESS)
                    .with_description("stiffness tensor computed once"),
            )?;
            bd.append_code_block(
                CodeBlockKind::InitializeLocalVariables,
                CodeBlock::new(self.origin).with(Statement::set(
                    Symbol::member(STIFFNESS),
                    config.member_stiffness().tensor(),
                )),
            );
        }

        let d = Stiffness::Tensor(Stensor4Expr::member(STIFFNESS));
        let mut stress = CodeBlock::new(self.origin);
        for s in config.degraded_stress(
            Stage::MidStep,
            &d,
            config.mid_step(ELASTIC_STRAIN),
            false,
        ) {
            stress.push(s);
        }
        let mut final_stress = CodeBlock::new(self.origin);
        for s in config.degraded_stress(
            Stage::EndOfStep,
            &d,
            StensorExpr::member(ELASTIC_STRAIN),
            false,
        ) {
            final_stress.push(s);
        }
        bd.append_code_block(CodeBlockKind::ComputeStress, stress);
        bd.append_code_block(CodeBlockKind::ComputeFinalStress, final_stress);

        self.stress_path = Some(StressPath::StiffnessTensor);
        self.tracker.complete(Hook::StressWithStiffnessTensor);
        Ok(())
    }

    /// Stress in Lamé form, `lambda tr(e) I + 2 mu e`.
    pub fn declare_isotropic_stress(
        &mut self,
        bd: &mut BehaviourDescription,
        lds: &mut LocalDataStructure,
    ) -> BrickResult<()> {
        self.tracker.check_hook(Hook::IsotropicStress)?;
        let config = self.config()?;
        let (Some((lambda_mts, mu_mts)), Some((lambda_ets, mu_ets))) =
            (config.lame(Stage::MidStep), config.lame(Stage::EndOfStep))
        else {
            return Err(BrickError::configuration(
                YOUNG_MODULUS,
                "the isotropic stress computation requires young_modulus and poisson_ratio",
            ));
        };

        if config.degradation.variable().is_some() {
            lds.add(SupportedType::Real, DEGRADATION_FACTOR)?;
        }
        let members = config.member_stiffness();
        let mut stress = CodeBlock::new(self.origin);
        let mut final_stress = CodeBlock::new(self.origin);
        let final_stiffness = if config.field_dependent {
            lds.add(SupportedType::Stress, LAMBDA_END_OF_STEP)?;
            lds.add(SupportedType::Stress, MU_END_OF_STEP)?;
            stress.push(Statement::set(Symbol::member(LAMBDA), lambda_mts));
            stress.push(Statement::set(Symbol::member(MU), mu_mts));
            final_stress.push(Statement::set(Symbol::local(LAMBDA_END_OF_STEP), lambda_ets));
            final_stress.push(Statement::set(Symbol::local(MU_END_OF_STEP), mu_ets));
            Stiffness::Lame(
                ScalarExpr::local(LAMBDA_END_OF_STEP),
                ScalarExpr::local(MU_END_OF_STEP),
            )
        } else {
            members.clone()
        };
        for s in config.degraded_stress(
            Stage::MidStep,
            &members,
            config.mid_step(ELASTIC_STRAIN),
            true,
        ) {
            stress.push(s);
        }
        for s in config.degraded_stress(
            Stage::EndOfStep,
            &final_stiffness,
            StensorExpr::member(ELASTIC_STRAIN),
            true,
        ) {
            final_stress.push(s);
        }
        bd.append_code_block(CodeBlockKind::ComputeStress, stress);
        bd.append_code_block(CodeBlockKind::ComputeFinalStress, final_stress);

        self.stress_path = Some(StressPath::Isotropic);
        self.tracker.complete(Hook::IsotropicStress);
        Ok(())
    }

    /// Elastic and secant tangent operators, plus the consistent one under an
    /// implicit scheme.
    pub fn add_generic_tangent_operator_support(
        &mut self,
        bd: &mut BehaviourDescription,
        dsl: &dyn BehaviourDsl,
    ) -> BrickResult<()> {
        self.tracker.check_hook(Hook::TangentOperator)?;
        let config = self.config()?;
        if !config.generic_tangent_operator {
            self.tracker.complete(Hook::TangentOperator);
            return Ok(());
        }
        let c = match (&config.representation, self.stress_path) {
            (ElasticRepresentation::StiffnessTensor, _)
            | (_, Some(StressPath::StiffnessTensor)) => Stensor4Expr::member(STIFFNESS),
            (ElasticRepresentation::Lame { .. }, _) if !config.field_dependent => {
                config.member_stiffness().tensor()
            }
            (ElasticRepresentation::Lame { .. }, Some(StressPath::Isotropic)) => {
                Stensor4Expr::isotropic(
                    ScalarExpr::local(LAMBDA_END_OF_STEP),
                    ScalarExpr::local(MU_END_OF_STEP),
                )
            }
            (ElasticRepresentation::Lame { .. }, None) => {
                return Err(BrickError::state(
                    "the tangent operator of field dependent elastic properties needs \
                     declare_isotropic_stress first",
                ));
            }
        };

        let dt = Symbol::member(TANGENT_OPERATOR);
        let mut block = CodeBlock::new(self.origin)
            .with(Statement::raw(ELASTIC_BRANCH))
            .with(Statement::set(dt.clone(), config.degradation.bounded_factor() * c.clone()));
        if config.implicit {
            block.push(Statement::raw("} else if (smt == CONSISTENTTANGENTOPERATOR) {"));
            block.push(Statement::raw(format!("StiffnessTensor {INVERSE_JACOBIAN_EEL};")));
            let ij_eel = Stensor4Expr::local(INVERSE_JACOBIAN_EEL);
            match config.degradation.variable() {
                None => {
                    block.push(Statement::raw(format!(
                        "getPartialJacobianInvert({INVERSE_JACOBIAN_EEL});"
                    )));
                    block.push(Statement::set(dt, c * ij_eel));
                }
                Some(d) => {
                    let ij_d = format!("iJ_{d}_{ELASTIC_STRAIN}");
                    block.push(Statement::raw(format!("Stensor {ij_d};")));
                    block.push(Statement::raw(format!(
                        "getPartialJacobianInvert({INVERSE_JACOBIAN_EEL}, {ij_d});"
                    )));
                    let consistent = config.degradation_factor(Stage::EndOfStep)
                        * (c.clone() * ij_eel)
                        - Stensor4Expr::outer(
                            c * StensorExpr::member(ELASTIC_STRAIN),
                            StensorExpr::local(ij_d),
                        );
                    block.push(Statement::set(dt, consistent));
                }
            }
        } else {
            // no partial Jacobian outside the implicit scheme
            debug!(
                brick = self.origin,
                dsl = dsl.name(),
                "consistent tangent operator not available"
            );
        }
        block.push(Statement::raw("} else {"));
        block.push(Statement::raw("  return false;"));
        block.push(Statement::raw("}"));
        bd.append_code_block(CodeBlockKind::TangentOperator, block);
        self.tracker.complete(Hook::TangentOperator);
        Ok(())
    }

    /// Elastic and secant prediction operators.
    pub fn add_generic_prediction_operator_support(
        &mut self,
        bd: &mut BehaviourDescription,
    ) -> BrickResult<()> {
        self.tracker.check_hook(Hook::PredictionOperator)?;
        let config = self.config()?;
        if !config.generic_prediction_operator {
            self.tracker.complete(Hook::PredictionOperator);
            return Ok(());
        }
        let mut block = CodeBlock::new(self.origin).with(Statement::raw(ELASTIC_BRANCH));
        let stiffness = config.beginning_of_step_stiffness(&mut block);
        block.push(Statement::set(
            Symbol::member(TANGENT_OPERATOR),
            config.degradation.bounded_factor() * stiffness.tensor(),
        ));
        block.push(Statement::raw("} else {"));
        block.push(Statement::raw("  return false;"));
        block.push(Statement::raw("}"));
        bd.append_code_block(CodeBlockKind::PredictionOperator, block);
        self.tracker.complete(Hook::PredictionOperator);
        Ok(())
    }
}
