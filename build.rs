use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let gitcl = vergen_gitcl::GitclBuilder::default().sha(true).build()?;
    vergen_gitcl::Emitter::default()
        .add_instructions(&gitcl)?
        .emit()?;
    Ok(())
}
