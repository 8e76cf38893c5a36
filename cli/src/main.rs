mod client;
mod render;
mod session;

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use recipeready_core::ai::{client_from_config, AiConfig};
use recipeready_core::{
    CookTime, Cuisine, Dietary, DifficultyFilter, FavoriteError, FileStorage,
    GeneratedRecipeCache, HealthProfile, MealType, Recipe, RecipeCoordinator, RecipeFilters,
    RecipeGenerator, SpiceLevel, DEFAULT_SERVINGS, EMPTY_INPUT_MESSAGE,
    GENERATION_FAILED_MESSAGE, QUICK_SUGGESTIONS,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::client::{ApiClient, ApiError, HttpFavoriteStore};
use crate::session::{Session, SessionStore};

#[derive(Parser)]
#[command(name = "recipeready")]
#[command(about = "RecipeReady CLI: turn what you have into something to cook", long_about = None)]
struct Cli {
    /// Server URL
    #[arg(long, global = true, env = "RECIPEREADY_SERVER", default_value = client::DEFAULT_SERVER)]
    server: String,

    /// Where generated recipes and the session are kept (default: ~/.recipeready)
    #[arg(long, global = true, env = "RECIPEREADY_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct FilterArgs {
    /// Number of servings (1-20)
    #[arg(long, default_value_t = DEFAULT_SERVINGS)]
    servings: u32,
    /// quick, medium, long
    #[arg(long, default_value = "any")]
    cook_time: CookTime,
    /// vegetarian, vegan, gluten-free, keto, dairy-free, low-carb, ...
    #[arg(long, default_value = "any")]
    dietary: Dietary,
    /// italian, mexican, indian, japanese, ...
    #[arg(long, default_value = "any")]
    cuisine: Cuisine,
    /// mild, medium, hot, very-hot
    #[arg(long, default_value = "any")]
    spice_level: SpiceLevel,
    /// breakfast, brunch, lunch, dinner, snack, dessert, appetizer, side-dish
    #[arg(long, default_value = "any")]
    meal_type: MealType,
    /// Health focus, e.g. weight-loss, heart-healthy, diabetic-friendly
    #[arg(long = "health", default_value = "any")]
    health_profile: HealthProfile,
    /// easy, medium, hard
    #[arg(long, default_value = "any")]
    difficulty: DifficultyFilter,
}

impl From<FilterArgs> for RecipeFilters {
    fn from(args: FilterArgs) -> Self {
        RecipeFilters {
            servings: args.servings,
            cook_time: args.cook_time,
            dietary: args.dietary,
            cuisine: args.cuisine,
            spice_level: args.spice_level,
            meal_type: args.meal_type,
            health_profile: args.health_profile,
            difficulty: args.difficulty,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a recipe from what you want to cook or what you have
    Generate {
        /// e.g. "I have potatoes, make me something delicious"
        #[arg(required = true)]
        request: Vec<String>,
        #[command(flatten)]
        filters: FilterArgs,
        /// Also save the new recipe to your favorites
        #[arg(long)]
        favorite: bool,
        /// Call the model directly instead of going through the server
        #[arg(long)]
        local: bool,
    },
    /// Show recently generated recipes
    Recent {
        /// Show every stored recipe, not just the latest few
        #[arg(long)]
        all: bool,
    },
    /// Show a recipe in full
    Show { id: String },
    /// Clear generated recipes (favorites are kept unless --all)
    Clear {
        #[arg(long)]
        all: bool,
    },
    /// List your favorite recipes
    Favorites,
    /// Save a recipe to your favorites
    Favorite { id: String },
    /// Remove a recipe from your favorites
    Unfavorite { id: String },
    /// Create an account
    Signup {
        email: String,
        #[arg(long, env = "RECIPEREADY_PASSWORD")]
        password: String,
    },
    /// Sign in
    Login {
        email: String,
        #[arg(long, env = "RECIPEREADY_PASSWORD")]
        password: String,
    },
    /// Sign out
    Logout,
    /// Show who is signed in
    Whoami,
    /// Ideas to get started
    Suggestions,
    /// Check that the server is up
    Ping,
}

/// Everything a recipe command needs: API access, the saved session and
/// the coordinator restored for this device.
struct AppContext {
    api: ApiClient,
    coordinator: RecipeCoordinator,
}

impl AppContext {
    async fn open(server: &str, data_dir: &Path) -> Result<Self> {
        let sessions = SessionStore::new(data_dir);
        let saved = sessions.load()?;

        let api = ApiClient::new(server, saved.as_ref().map(|s| s.token.clone()));
        let store = Arc::new(HttpFavoriteStore::new(api.clone()));
        let cache = GeneratedRecipeCache::new(Box::new(FileStorage::new(data_dir)));
        let mut coordinator = RecipeCoordinator::new(store, cache);

        if saved.is_some() {
            match api.me().await {
                Ok(user) => {
                    if let Err(e) = coordinator.set_user(Some(user)).await {
                        eprintln!("{}", e.user_message());
                    }
                }
                Err(ApiError::Unauthorized) => {
                    sessions.clear()?;
                    eprintln!("Your session has expired. Please log in again.");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Could not restore session");
                    eprintln!("Could not reach the server; favorites are unavailable.");
                }
            }
        }

        Ok(Self { api, coordinator })
    }

    fn require_user(&self) -> Result<()> {
        if self.coordinator.user().is_none() {
            bail!(FavoriteError::NotSignedIn.user_message());
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let data_dir = cli.data_dir.unwrap_or_else(FileStorage::default_dir);
    let server = cli.server;

    match cli.command {
        Commands::Generate {
            request,
            filters,
            favorite,
            local,
        } => {
            let mut ctx = AppContext::open(&server, &data_dir).await?;
            generate(&mut ctx, &request.join(" "), filters.into(), favorite, local).await?;
        }
        Commands::Recent { all } => {
            let ctx = AppContext::open(&server, &data_dir).await?;
            let state = ctx.coordinator.state();
            let recipes: &[Recipe] = if all {
                &state.generated
            } else {
                state.recent_recipes()
            };
            if recipes.is_empty() {
                println!("No recipes yet. Try `recipeready suggestions` for ideas.");
            }
            for recipe in recipes {
                println!("{}", render::format_summary(recipe, state.is_favorite(&recipe.id)));
            }
        }
        Commands::Show { id } => {
            let ctx = AppContext::open(&server, &data_dir).await?;
            let Some(recipe) = ctx.coordinator.find_recipe(&id) else {
                bail!("Recipe {} not found", id);
            };
            println!(
                "{}",
                render::format_recipe(recipe, ctx.coordinator.is_favorite(&id))
            );
        }
        Commands::Clear { all } => {
            let mut ctx = AppContext::open(&server, &data_dir).await?;
            if all {
                ctx.coordinator.clear_all_generated_recipes();
                println!("All recipes cleared!");
            } else {
                ctx.coordinator.clear_generated_recipes();
                println!("Cleared recipes that aren't favorites.");
            }
        }
        Commands::Favorites => {
            let ctx = AppContext::open(&server, &data_dir).await?;
            ctx.require_user()?;
            let favorites = &ctx.coordinator.state().favorites;
            if favorites.is_empty() {
                println!("No favorites yet.");
            }
            for recipe in favorites {
                println!("{}", render::format_summary(recipe, true));
            }
        }
        Commands::Favorite { id } => {
            let mut ctx = AppContext::open(&server, &data_dir).await?;
            ctx.require_user()?;
            let Some(recipe) = ctx.coordinator.find_recipe(&id).cloned() else {
                bail!("Recipe {} not found", id);
            };
            if let Err(e) = ctx.coordinator.add_to_favorites(&recipe).await {
                bail!(e.user_message());
            }
            println!("Added \"{}\" to favorites.", recipe.title);
        }
        Commands::Unfavorite { id } => {
            let mut ctx = AppContext::open(&server, &data_dir).await?;
            ctx.require_user()?;
            if let Err(e) = ctx.coordinator.remove_from_favorites(&id).await {
                bail!(e.user_message());
            }
            println!("Removed from favorites.");
        }
        Commands::Signup { email, password } => {
            let api = ApiClient::new(&server, None);
            let auth = api.signup(&email, &password).await?;
            save_session(&data_dir, &email, auth.user_id, auth.token)?;
            println!("Welcome, {}!", email);
        }
        Commands::Login { email, password } => {
            let api = ApiClient::new(&server, None);
            let auth = api.login(&email, &password).await?;
            save_session(&data_dir, &email, auth.user_id, auth.token)?;
            println!("Signed in as {}.", email);
        }
        Commands::Logout => {
            let sessions = SessionStore::new(&data_dir);
            if let Some(session) = sessions.load()? {
                let api = ApiClient::new(&server, Some(session.token));
                match api.logout().await {
                    Ok(()) | Err(ApiError::Unauthorized) => {}
                    Err(e) => tracing::warn!(error = %e, "Server logout failed"),
                }
                sessions.clear()?;
            }
            println!("Signed out.");
        }
        Commands::Whoami => {
            let ctx = AppContext::open(&server, &data_dir).await?;
            match ctx.coordinator.user() {
                Some(user) => println!("{} ({})", user.email, user.id),
                None => println!("Not signed in."),
            }
        }
        Commands::Suggestions => {
            for suggestion in QUICK_SUGGESTIONS {
                println!("{}", suggestion);
            }
        }
        Commands::Ping => {
            let api = ApiClient::new(&server, None);
            let health = api.health().await?;
            println!("{} (model: {})", health.status, health.model);
        }
    }

    Ok(())
}

fn save_session(data_dir: &Path, email: &str, user_id: uuid::Uuid, token: String) -> Result<()> {
    SessionStore::new(data_dir).save(&Session {
        token,
        user_id,
        email: email.to_string(),
    })
}

async fn generate(
    ctx: &mut AppContext,
    input: &str,
    filters: RecipeFilters,
    favorite: bool,
    local: bool,
) -> Result<()> {
    if input.trim().is_empty() {
        bail!(EMPTY_INPUT_MESSAGE);
    }
    filters.validate()?;

    let recipe = if local {
        let generator = RecipeGenerator::new(Arc::from(client_from_config(AiConfig::from_env()?)));
        match generator.generate(input, &filters).await {
            Ok(recipe) => recipe,
            Err(e) => bail!(e.user_message()),
        }
    } else {
        match ctx.api.generate(input, &filters).await {
            Ok(recipe) => recipe,
            Err(ApiError::Status { message, .. }) => bail!(message),
            Err(e) => {
                tracing::error!(error = %e, "Generation request failed");
                bail!(GENERATION_FAILED_MESSAGE);
            }
        }
    };

    ctx.coordinator.clear_generated_recipes();
    ctx.coordinator.add_generated_recipe(recipe.clone());

    println!("{}", render::format_recipe(&recipe, false));

    if favorite {
        match ctx.coordinator.add_to_favorites(&recipe).await {
            Ok(()) => println!("\nSaved to favorites."),
            Err(e) => eprintln!("\n{}", e.user_message()),
        }
    }

    Ok(())
}
