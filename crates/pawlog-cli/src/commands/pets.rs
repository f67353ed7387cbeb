use pawlog_core::controllers::{LoadState, PetsListController, SinglePetController};
use pawlog_core::models::PetForm;

use crate::cli::{LogTab, PetsCommands};
use crate::commands::common::{
    connect, format_log_lines, format_pet_header, format_pet_lines, parse_pet_id,
    pet_to_list_item, print_notices, tab_kind, PetListItem,
};
use crate::error::CliError;

pub async fn run_pets(command: PetsCommands, profile: Option<&str>) -> Result<(), CliError> {
    match command {
        PetsCommands::List { json } => run_list(json, profile).await,
        PetsCommands::Add {
            name,
            species,
            breed,
            age,
        } => {
            let form = PetForm {
                name,
                species,
                breed: breed.unwrap_or_default(),
                age,
            };
            run_add(form, profile).await
        }
        PetsCommands::Show { id, tab, json } => run_show(&id, tab, json, profile).await,
    }
}

async fn run_list(as_json: bool, profile: Option<&str>) -> Result<(), CliError> {
    let records = connect(profile).await?;
    let mut screen = PetsListController::new(records);
    screen.activate().await;
    print_notices(&screen.take_notices());

    match screen.state() {
        LoadState::Ready(pets) if as_json => {
            let items = pets.iter().map(pet_to_list_item).collect::<Vec<PetListItem>>();
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
        LoadState::Ready(pets) => {
            for line in format_pet_lines(pets) {
                println!("{line}");
            }
        }
        LoadState::Empty if as_json => println!("[]"),
        LoadState::Empty => println!("No pets yet. Add one with `pawlog pets add`."),
        LoadState::Failed(message) => return Err(CliError::LoadFailed(message.clone())),
        LoadState::Idle | LoadState::Loading => {}
    }
    Ok(())
}

async fn run_add(form: PetForm, profile: Option<&str>) -> Result<(), CliError> {
    let records = connect(profile).await?;
    let mut screen = PetsListController::new(records);
    let pet = screen.create_pet(form).await?;
    print_notices(&screen.take_notices());
    println!("Added {} ({})", pet.name, pet.id);
    Ok(())
}

async fn run_show(
    raw_id: &str,
    tab: LogTab,
    as_json: bool,
    profile: Option<&str>,
) -> Result<(), CliError> {
    let pet_id = parse_pet_id(raw_id)?;
    let records = connect(profile).await?;
    let mut screen = SinglePetController::new(records, pet_id);
    screen.select_tab(tab_kind(tab));
    screen.activate().await;
    print_notices(&screen.take_notices());

    match screen.state() {
        LoadState::Ready(pet) if as_json => {
            println!("{}", serde_json::to_string_pretty(pet)?);
        }
        LoadState::Ready(pet) => {
            for line in format_pet_header(pet) {
                println!("{line}");
            }
            println!();
            for line in format_log_lines(pet, screen.active_tab()) {
                println!("{line}");
            }
        }
        LoadState::Empty => {
            return Err(pawlog_core::Error::NotFound(format!("pet {pet_id}")).into());
        }
        LoadState::Failed(message) => return Err(CliError::LoadFailed(message.clone())),
        LoadState::Idle | LoadState::Loading => {}
    }
    Ok(())
}
