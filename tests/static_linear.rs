//! Linear static analysis of small bar models

use std::sync::Arc;

use approx::assert_relative_eq;
use fea_static::analysis::DofSlot;
use fea_static::math::GaussianIntegrator;
use fea_static::prelude::*;
use nalgebra::Vector3;
use rayon::prelude::*;

const E: f64 = 200e9;
const NU: f64 = 0.3;
const A: f64 = 5e-3;
const IY: f64 = 2e-5;
const IZ: f64 = 6e-5;
const J: f64 = 1e-5;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn section() -> Arc<dyn CrossSection> {
    Arc::new(UniformSection::new(SectionProperties::new(A, IY, IZ, J)))
}

fn material() -> Arc<UniformIsotropicMaterial> {
    Arc::new(UniformIsotropicMaterial::from_young_poisson(E, NU).unwrap())
}

fn frame(model: &mut Model, i: usize, j: usize) -> usize {
    model
        .add_element(BarElement::new(i, j, section(), material()))
        .unwrap()
}

fn cantilever(length: f64) -> Model {
    let mut model = Model::new();
    let n1 = model.add_node(Node::new(0.0, 0.0, 0.0).with_constraints(Constraints::fixed()));
    let n2 = model.add_node(Node::new(length, 0.0, 0.0));
    frame(&mut model, n1, n2);
    model
}

fn portal(span: f64, height: f64) -> Model {
    let mut model = Model::new();
    let n1 = model.add_node(Node::new(0.0, 0.0, 0.0).with_constraints(Constraints::fixed()));
    let n2 = model.add_node(Node::new(span, 0.0, 0.0).with_constraints(Constraints::fixed()));
    let n3 = model.add_node(Node::new(0.0, height, 0.0));
    let n4 = model.add_node(Node::new(span, height, 0.0));
    frame(&mut model, n1, n3);
    frame(&mut model, n2, n4);
    frame(&mut model, n3, n4);
    model
}

#[test]
fn test_cantilever_tip_load() {
    init_logger();
    let length = 3.0;
    let p = 12e3;
    let case = LoadCase::live("Tip");
    let mut model = cantilever(length);
    model
        .add_nodal_load(1, NodalLoad::force(0.0, -p, p, case.clone()))
        .unwrap();
    model.solve().unwrap();

    let tip = model.node_displacement(1, &case).unwrap();
    assert_relative_eq!(tip.dy, -p * length.powi(3) / (3.0 * E * IZ), max_relative = 1e-9);
    assert_relative_eq!(tip.rz, -p * length.powi(2) / (2.0 * E * IZ), max_relative = 1e-9);
    assert_relative_eq!(tip.dz, p * length.powi(3) / (3.0 * E * IY), max_relative = 1e-9);
    // Bending in the x-z plane: ry = -dw/dx
    assert_relative_eq!(tip.ry, -p * length.powi(2) / (2.0 * E * IY), max_relative = 1e-9);
    assert_relative_eq!(tip.dx, 0.0, epsilon = 1e-15);

    let root = model.support_reaction(0, &case).unwrap();
    assert_relative_eq!(root.fy, p, max_relative = 1e-9);
    assert_relative_eq!(root.fz, -p, max_relative = 1e-9);
    assert_relative_eq!(root.mz, p * length, max_relative = 1e-9);
    assert_relative_eq!(root.my, p * length, max_relative = 1e-9);
}

#[test]
fn test_cantilever_uniform_member_load() {
    let length = 4.0;
    let w = 5e3;
    let case = LoadCase::dead("D");
    let mut model = cantilever(length);
    model
        .add_element_load(
            0,
            UniformLoad::new(
                Vector3::new(0.0, -2.0, 0.0),
                w,
                CoordinationSystem::Global,
                case.clone(),
            ),
        )
        .unwrap();
    model.solve().unwrap();

    let q = -w;
    let ei = E * IZ;
    let tip = model.node_displacement(1, &case).unwrap();
    assert_relative_eq!(tip.dy, q * length.powi(4) / (8.0 * ei), max_relative = 1e-9);

    let root = model.support_reaction(0, &case).unwrap();
    assert_relative_eq!(root.fy, w * length, max_relative = 1e-9);

    // Superposition of the nodal field and the load-only field
    let mid_force = model.element_internal_force(0, &case, 0.0).unwrap();
    assert_relative_eq!(mid_force.mz, q * length * length / 8.0, max_relative = 1e-8);
    assert_relative_eq!(mid_force.fy, q * length / 2.0, max_relative = 1e-8);

    let mid = model.element_internal_displacement(0, &case, 0.0).unwrap();
    assert_relative_eq!(mid.dy, 17.0 * q * length.powi(4) / (384.0 * ei), max_relative = 1e-8);
}

#[test]
fn test_axial_bar() {
    let length = 2.5;
    let p = 40e3;
    let case = LoadCase::default_case();

    let mut model = Model::new();
    let n1 = model.add_node(Node::new(0.0, 0.0, 0.0).with_constraints(Constraints::fixed()));
    let slider: Constraints = "RFFFFF".parse().unwrap();
    let n2 = model.add_node(Node::new(length, 0.0, 0.0).with_constraints(slider));
    model
        .add_element(
            BarElement::new(n1, n2, section(), material()).with_behaviour(BarBehaviour::TRUSS),
        )
        .unwrap();
    model
        .add_nodal_load(n2, NodalLoad::force(p, 0.0, 0.0, case.clone()))
        .unwrap();
    model.solve().unwrap();

    let end = model.node_displacement(n2, &case).unwrap();
    assert_relative_eq!(end.dx, p * length / (E * A), max_relative = 1e-12);
    let force = model.element_internal_force(0, &case, 0.3).unwrap();
    assert_relative_eq!(force.fx, p, max_relative = 1e-10);
}

#[test]
fn test_portal_frame_equilibrium() {
    let span = 6.0;
    let height = 4.0;
    let w = 20e3;
    let h = 10e3;
    let dead = LoadCase::dead("Dead");
    let wind = LoadCase::wind("Wind");

    let mut model = portal(span, height);
    model
        .add_element_load(
            2,
            UniformLoad::new(
                Vector3::new(0.0, -1.0, 0.0),
                w,
                CoordinationSystem::Global,
                dead.clone(),
            ),
        )
        .unwrap();
    model
        .add_nodal_load(2, NodalLoad::force(h, 0.0, 0.0, wind.clone()))
        .unwrap();
    model.solve().unwrap();

    let r1 = model.support_reaction(0, &dead).unwrap();
    let r2 = model.support_reaction(1, &dead).unwrap();
    assert_relative_eq!(r1.fy + r2.fy, w * span, max_relative = 1e-9);
    assert_relative_eq!(r1.fx + r2.fx, 0.0, epsilon = 1e-6);
    assert_relative_eq!(r1.fy, r2.fy, max_relative = 1e-9);

    let r1 = model.support_reaction(0, &wind).unwrap();
    let r2 = model.support_reaction(1, &wind).unwrap();
    assert_relative_eq!(r1.fx + r2.fx, -h, max_relative = 1e-9);
    assert_relative_eq!(r1.fy + r2.fy, 0.0, epsilon = 1e-6);
    // Moments about the origin
    assert_relative_eq!(r1.mz + r2.mz + span * r2.fy, h * height, max_relative = 1e-9);

    let summary = model.summary(&dead).unwrap();
    assert_eq!(summary.num_nodes, 4);
    assert_eq!(summary.num_elements, 3);
    assert_eq!(summary.free_dofs, 12);
    assert_relative_eq!(summary.total_reaction[1], w * span, max_relative = 1e-9);
}

#[test]
fn test_inclined_member_global_load() {
    let case = LoadCase::snow("S");
    let w = 2e3;
    let mut model = Model::new();
    let n1 = model.add_node(Node::new(0.0, 0.0, 0.0).with_constraints(Constraints::fixed()));
    let n2 = model.add_node(Node::new(3.0, 3.0, 1.0));
    frame(&mut model, n1, n2);
    model
        .add_element_load(
            0,
            UniformLoad::new(
                Vector3::new(0.0, -1.0, 0.0),
                w,
                CoordinationSystem::Global,
                case.clone(),
            ),
        )
        .unwrap();
    model.solve().unwrap();

    let length = model.element(0).unwrap().length();
    let root = model.support_reaction(0, &case).unwrap();
    assert_relative_eq!(root.fy, w * length, max_relative = 1e-9);
    assert_relative_eq!(root.fx, 0.0, epsilon = 1e-6);
    assert_relative_eq!(root.fz, 0.0, epsilon = 1e-6);
    // Resultant acts at mid-length: M = r × F
    assert_relative_eq!(root.mx, -(0.5 * w * length), max_relative = 1e-9);
    assert_relative_eq!(root.mz, 1.5 * w * length, max_relative = 1e-9);
}

#[test]
fn test_support_settlement() {
    let length = 4.0;
    let delta = 0.01;
    let settle = LoadCase::new("Settlement", LoadType::Other);
    let other = LoadCase::live("L");

    let mut model = Model::new();
    let n1 = model.add_node(Node::new(0.0, 0.0, 0.0).with_constraints(Constraints::fixed()));
    let n2 = model.add_node(Node::new(length / 2.0, 0.0, 0.0));
    let n3 = model.add_node(Node::new(length, 0.0, 0.0).with_constraints(Constraints::fixed()));
    frame(&mut model, n1, n2);
    frame(&mut model, n2, n3);
    model
        .set_settlement(n3, Displacement::new(0.0, -delta, 0.0, 0.0, 0.0, 0.0))
        .unwrap();
    model.set_settlements_load_case(Some(settle.clone()));
    model.solve().unwrap();

    let ei = E * IZ;
    let mid = model.node_displacement(n2, &settle).unwrap();
    assert_relative_eq!(mid.dy, -delta / 2.0, max_relative = 1e-9);
    assert_relative_eq!(mid.rz, -1.5 * delta / length, max_relative = 1e-9);

    let end = model.node_displacement(n3, &settle).unwrap();
    assert_eq!(end.dy, -delta);

    let r1 = model.support_reaction(n1, &settle).unwrap();
    let r3 = model.support_reaction(n3, &settle).unwrap();
    assert_relative_eq!(r1.fy, 12.0 * ei * delta / length.powi(3), max_relative = 1e-9);
    assert_relative_eq!(r3.fy, -12.0 * ei * delta / length.powi(3), max_relative = 1e-9);
    assert_relative_eq!(r1.mz, 6.0 * ei * delta / length.powi(2), max_relative = 1e-9);
    assert_relative_eq!(r3.mz, 6.0 * ei * delta / length.powi(2), max_relative = 1e-9);

    // Settlements only belong to their case
    let unloaded = model.displacements(&other).unwrap();
    assert!(unloaded.iter().all(|v| *v == 0.0));
}

#[test]
fn test_scatter_covers_every_dof_once() {
    let mut model = portal(5.0, 3.0);
    model.set_constraints(3, Constraints::pinned()).unwrap();
    let case = LoadCase::default_case();
    model
        .add_nodal_load(2, NodalLoad::force(1e3, -2e3, 5e2, case.clone()))
        .unwrap();
    model.solve().unwrap();

    let analysis = model.analysis().unwrap();
    let map = analysis.dof_map();
    let total = 6 * model.nodes().len();
    assert_eq!(map.total_dofs(), total);

    let mut hits = vec![0; total];
    for &g in map.free_to_global().iter().chain(map.fixed_to_global()) {
        hits[g] += 1;
    }
    assert!(hits.iter().all(|&h| h == 1));

    let result = model.result(&case).unwrap();
    assert_eq!(result.displacements.len(), total);
    assert_eq!(result.forces.len(), total);
    for g in 0..total {
        match map.slot(g) {
            Some(DofSlot::Fixed(_)) => assert_eq!(result.displacements[g], 0.0),
            Some(DofSlot::Free(_)) => assert_eq!(result.reactions[g], 0.0),
            None => panic!("DOF {} not mapped", g),
        }
    }
    assert_eq!(result.forces[12], 1e3);
    assert_eq!(result.forces[13], -2e3);
}

#[test]
fn test_results_are_computed_once() {
    let case = LoadCase::live("L");
    let mut model = cantilever(2.0);
    model
        .add_nodal_load(1, NodalLoad::force(0.0, -1e3, 0.0, case.clone()))
        .unwrap();
    model.solve().unwrap();
    let analysis = model.analysis().unwrap();

    let first = analysis
        .add_analysis_result_if_not_exists(&model, &case)
        .unwrap();
    let second = analysis
        .add_analysis_result_if_not_exists(&model, &case)
        .unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(analysis.computation_count(), 1);
    assert!(analysis.contains(&case));

    // Concurrent requests for one case still compute it once
    analysis.clear_results();
    (0..16).into_par_iter().for_each(|_| {
        analysis
            .add_analysis_result_if_not_exists(&model, &case)
            .unwrap();
    });
    assert_eq!(analysis.computation_count(), 2);

    let recomputed = analysis.add_analysis_result(&model, &case).unwrap();
    assert_eq!(analysis.computation_count(), 3);
    assert_eq!(recomputed.displacements, first.displacements);
    assert!(Arc::ptr_eq(&recomputed, &analysis.result(&case).unwrap()));
}

#[test]
fn test_parallel_matches_sequential() {
    let build = || {
        let mut model = portal(6.0, 4.0);
        for c in 0..6 {
            let case = LoadCase::live(&format!("L{}", c));
            model
                .add_element_load(
                    2,
                    ConcentratedLoad::new(
                        Force::new(0.0, -1e3 * (c + 1) as f64, 0.0, 0.0, 0.0, 0.0),
                        -0.8 + 0.3 * c as f64,
                        CoordinationSystem::Global,
                        case.clone(),
                    ),
                )
                .unwrap();
            model
                .add_nodal_load(3, NodalLoad::force(500.0 * c as f64, 0.0, 0.0, case))
                .unwrap();
        }
        model
    };

    let mut parallel = build();
    let cases = parallel.load_cases();
    assert_eq!(cases.len(), 6);
    parallel
        .solve_with(AnalysisOptions::default().with_load_cases(cases.clone()))
        .unwrap();

    let mut sequential = build();
    sequential
        .solve_with(
            AnalysisOptions::default()
                .sequential()
                .with_load_cases(cases.clone()),
        )
        .unwrap();

    assert_eq!(parallel.analysis().unwrap().computation_count(), 6);
    assert_eq!(sequential.analysis().unwrap().computation_count(), 6);
    for case in &cases {
        let p = parallel.result(case).unwrap();
        let s = sequential.result(case).unwrap();
        assert_eq!(p.displacements, s.displacements);
        assert_eq!(p.forces, s.forces);
    }
}

#[test]
fn test_unstable_models_are_rejected() {
    // Node without any element
    let mut model = cantilever(2.0);
    model.add_node(Node::new(5.0, 5.0, 0.0));
    assert!(matches!(model.solve(), Err(FEAError::NumericalFailure(_))));
    assert!(!model.is_analyzed());

    // Truss bars leave rotations unrestrained
    let mut model = Model::new();
    let n1 = model.add_node(Node::new(0.0, 0.0, 0.0).with_constraints(Constraints::fixed()));
    let n2 = model.add_node(Node::new(1.0, 0.0, 0.0));
    model
        .add_element(
            BarElement::new(n1, n2, section(), material()).with_behaviour(BarBehaviour::TRUSS),
        )
        .unwrap();
    assert!(matches!(model.solve(), Err(FEAError::NumericalFailure(_))));

    // Pivot ratios never exceed one
    let mut model = cantilever(2.0);
    let result = model.solve_with(AnalysisOptions::default().with_pivot_tolerance(2.0));
    assert!(matches!(result, Err(FEAError::NumericalFailure(_))));
    assert!(!model.is_analyzed());
}

#[test]
fn test_argument_errors() {
    let case = LoadCase::default_case();
    let mut model = cantilever(2.0);
    model.solve().unwrap();

    let err = model.element_internal_force(0, &case, 1.5).unwrap_err();
    assert!(matches!(err, FEAError::OutOfRange(_)));
    assert!(err.is_invalid_argument());
    assert!(matches!(
        model.element_internal_force(3, &case, 0.0),
        Err(FEAError::ElementNotFound(3))
    ));

    let zero_direction = UniformLoad::new(
        Vector3::zeros(),
        1.0,
        CoordinationSystem::Global,
        case.clone(),
    );
    assert!(model.add_element_load(0, zero_direction).is_err());
    let outside = ConcentratedLoad::new(Force::zero(), -1.2, CoordinationSystem::Local, case);
    assert!(matches!(
        model.add_element_load(0, outside),
        Err(FEAError::OutOfRange(_))
    ));
}

#[test]
fn test_degenerate_integration_interval() {
    let mut calls = 0;
    let value = GaussianIntegrator::new(0.5, 0.5, 4)
        .integrate_scalar(|x| {
            calls += 1;
            Ok(x * x)
        })
        .unwrap();
    assert_eq!(value, 0.0);
    assert_eq!(calls, 0);

    let matrix = GaussianIntegrator::new(-1.0, -1.0, 3)
        .integrate_matrix(2, 3, |_, _| panic!("integrand must not be evaluated"))
        .unwrap();
    assert_eq!(matrix.shape(), (2, 3));
    assert!(matrix.iter().all(|v| *v == 0.0));
}
