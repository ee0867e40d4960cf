use mongodb::Database;
use std::sync::Arc;
use workhive_config::Settings;
use workhive_services::{
    AuthService, BlobStorage, GoogleVerifier,
    dao::{
        comment::CommentDao, invitation::InvitationDao, project::ProjectDao, task::TaskDao,
        user::UserDao, workspace::WorkspaceDao,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub settings: Settings,
    pub auth: Arc<AuthService>,
    pub google: Arc<GoogleVerifier>,
    pub storage: Arc<BlobStorage>,
    pub users: Arc<UserDao>,
    pub workspaces: Arc<WorkspaceDao>,
    pub invitations: Arc<InvitationDao>,
    pub projects: Arc<ProjectDao>,
    pub tasks: Arc<TaskDao>,
    pub comments: Arc<CommentDao>,
}

impl AppState {
    pub fn new(db: Database, settings: Settings) -> Self {
        let auth = Arc::new(AuthService::new(settings.jwt.clone(), settings.otp.clone()));
        let google = Arc::new(GoogleVerifier::new(settings.google.clone()));
        let storage = Arc::new(BlobStorage::new(&settings.storage));
        let users = Arc::new(UserDao::new(&db));
        let workspaces = Arc::new(WorkspaceDao::new(&db));
        let invitations = Arc::new(InvitationDao::new(&db));
        let projects = Arc::new(ProjectDao::new(&db));
        let tasks = Arc::new(TaskDao::new(&db));
        let comments = Arc::new(CommentDao::new(&db));

        Self {
            db,
            settings,
            auth,
            google,
            storage,
            users,
            workspaces,
            invitations,
            projects,
            tasks,
            comments,
        }
    }
}
