//! FEA Static Example - Simple Portal Frame

use std::sync::Arc;

use anyhow::Result;
use fea_static::prelude::*;
use nalgebra::Vector3;

fn main() -> Result<()> {
    env_logger::init();
    println!("=== FEA Static Example: Portal Frame ===\n");

    let mut model = Model::new();

    // W12x26 (approximate properties, SI)
    let section: Arc<dyn CrossSection> = Arc::new(UniformSection::new(SectionProperties::new(
        0.00494, 8.49e-5, 7.2e-6, 1.25e-7,
    )));
    let steel = Arc::new(UniformIsotropicMaterial::steel());

    // Create a simple portal frame
    //
    //     N3 -------- N4
    //     |          |
    //     |          |
    //     N1        N2
    //   Fixed     Fixed
    //
    let height = 4.0;
    let span = 6.0;

    let n1 = model.add_node(Node::new(0.0, 0.0, 0.0).with_constraints(Constraints::fixed()));
    let n2 = model.add_node(Node::new(span, 0.0, 0.0).with_constraints(Constraints::fixed()));
    let n3 = model.add_node(Node::new(0.0, height, 0.0));
    let n4 = model.add_node(Node::new(span, height, 0.0));

    let members = [
        ("Col1", n1, n3),
        ("Col2", n2, n4),
        ("Beam", n3, n4),
    ];
    for (label, i, j) in members {
        model.add_element(BarElement::new(i, j, section.clone(), steel.clone()).with_label(label))?;
    }
    let beam = 2;

    // Dead: 20 kN/m on the beam, downward
    let dead = LoadCase::dead("Dead");
    model.add_element_load(
        beam,
        UniformLoad::new(
            Vector3::new(0.0, -1.0, 0.0),
            20000.0,
            CoordinationSystem::Global,
            dead.clone(),
        ),
    )?;

    // Wind: 10 kN at roof level
    let wind = LoadCase::wind("Wind");
    model.add_nodal_load(n3, NodalLoad::force(10000.0, 0.0, 0.0, wind.clone()))?;

    // Settlement of the right support, 5 mm down
    let settlement = LoadCase::new("Settlement", LoadType::Other);
    model.set_settlement(n2, Displacement::new(0.0, -0.005, 0.0, 0.0, 0.0, 0.0))?;
    model.set_settlements_load_case(Some(settlement.clone()));

    println!("Factoring stiffness and solving load cases...\n");
    let cases = model.load_cases();
    model.solve_with(AnalysisOptions::default().with_load_cases(cases))?;

    for case in [&dead, &wind, &settlement] {
        println!("=== Results for {} ===\n", case);

        println!("Node Displacements:");
        for (node, name) in [(n3, "N3"), (n4, "N4")] {
            let disp = model.node_displacement(node, case)?;
            println!(
                "  {}: DX={:.4}mm, DY={:.4}mm, RZ={:.6}rad",
                name,
                disp.dx * 1000.0,
                disp.dy * 1000.0,
                disp.rz
            );
        }

        println!("\nSupport Reactions:");
        for (node, name) in [(n1, "N1"), (n2, "N2")] {
            let rxn = model.support_reaction(node, case)?;
            println!(
                "  {}: FX={:.2}kN, FY={:.2}kN, MZ={:.2}kN·m",
                name,
                rxn.fx / 1000.0,
                rxn.fy / 1000.0,
                rxn.mz / 1000.0
            );
        }

        let midspan = model.element_internal_force(beam, case, 0.0)?;
        let sag = model.element_internal_displacement(beam, case, 0.0)?;
        println!(
            "\nBeam midspan: Mz={:.2}kN·m, Vy={:.2}kN, v={:.4}mm",
            midspan.mz / 1000.0,
            midspan.fy / 1000.0,
            sag.dy * 1000.0
        );

        let summary = model.summary(case)?;
        println!("\nSummary:");
        println!(
            "  Max displacement: {:.4}mm at node {}",
            summary.max_displacement * 1000.0,
            summary.max_disp_node
        );
        println!(
            "  Max reaction: {:.2}kN at node {}",
            summary.max_reaction / 1000.0,
            summary.max_reaction_node
        );
        println!();
    }

    let analysis = model.analysis()?;
    println!(
        "Solved {} load cases with one factorization ({} free DOFs)",
        analysis.computation_count(),
        analysis.dof_map().free_count()
    );

    println!("\n=== Analysis Complete ===");
    Ok(())
}
