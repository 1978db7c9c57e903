use confgen::core::models::molecule::Molecule;
use confgen::engine::state::Conformer;
use std::io::{self, Write};

/// Writes each conformer as one XYZ block; the comment line carries name, rank, energy
/// and the trial that produced it.
pub fn write_xyz<W: Write>(
    writer: &mut W,
    molecule: &Molecule,
    name: &str,
    conformers: &[Conformer],
) -> io::Result<()> {
    for (rank, conformer) in conformers.iter().enumerate() {
        writeln!(writer, "{}", molecule.atom_count())?;
        writeln!(
            writer,
            "{} conformer={} energy={:.6} kcal/mol trial={}",
            name,
            rank + 1,
            conformer.energy,
            conformer.trial
        )?;
        for (index, position) in conformer.coords.iter().enumerate() {
            writeln!(
                writer,
                "{:<2} {:>12.6} {:>12.6} {:>12.6}",
                molecule.element(index).symbol(),
                position.x,
                position.y,
                position.z
            )?;
        }
    }
    Ok(())
}
