use discipline_api::mock::{ListShape, MockCredentials, MockServer};
use discipline_api::wire::DisciplineDto;
use discipline_api::{DisciplineApi, RestClient};
use discipline_core::{AllocatedDiscipline, DisciplineDraft, Error};

fn dto(code: &str, name: &str) -> DisciplineDto {
    DisciplineDto {
        code: Some(code.into()),
        name: Some(name.into()),
        ..DisciplineDto::default()
    }
}

async fn server() -> (MockServer, RestClient) {
    let server = MockServer::start(MockCredentials::default()).await.unwrap();
    let client = RestClient::new(server.config()).unwrap();
    (server, client)
}

#[tokio::test]
async fn test_list_is_the_same_for_both_shapes() {
    let (server, client) = server().await;
    server.seed_discipline(dto("DISC01", "Civil")).await;
    server.seed_discipline(dto("DISC02", "Electrical")).await;

    let paged = client.list_disciplines(500).await.unwrap();
    server.set_list_shape(ListShape::Bare).await;
    let bare = client.list_disciplines(500).await.unwrap();

    assert_eq!(paged, bare);
    assert_eq!(paged.len(), 2);
    assert!(paged.iter().all(|d| d.is_active));
    assert!(paged.iter().all(|d| d.description.is_empty()));
}

#[tokio::test]
async fn test_list_sends_max_result_count() {
    let (server, client) = server().await;
    for i in 1..=5 {
        server.seed_discipline(dto(&format!("DISC{i:02}"), &format!("D{i}"))).await;
    }

    assert_eq!(client.list_disciplines(3).await.unwrap().len(), 3);
    assert_eq!(client.list_disciplines(500).await.unwrap().len(), 5);
}

#[tokio::test]
async fn test_get_missing_is_none() {
    let (server, client) = server().await;
    let id = server.seed_discipline(dto("DISC01", "Civil")).await;

    let found = client.get_discipline(&id).await.unwrap().unwrap();
    assert_eq!(found.code, "DISC01");

    assert!(client.get_discipline("no-such-id").await.unwrap().is_none());
}

#[tokio::test]
async fn test_create_then_update_keeps_code() {
    let (_server, client) = server().await;

    let allocated = AllocatedDiscipline {
        code: "DISC01".into(),
        draft: DisciplineDraft::named("Civil").with_project("p-1"),
    };
    let created = client.create_discipline(&allocated).await.unwrap();
    assert!(!created.id.is_empty());
    assert_eq!(created.code, "DISC01");
    assert_eq!(created.project_id(), Some("p-1"));

    let mut edited = created.clone();
    edited.description = "Roads and bridges".into();
    let updated = client.update_discipline(&created.id, &edited).await.unwrap();
    assert_eq!(updated.description, "Roads and bridges");
    assert_eq!(updated.code, "DISC01");

    let mut recoded = updated.clone();
    recoded.code = "DISC99".into();
    let err = client.update_discipline(&created.id, &recoded).await.unwrap_err();
    assert!(matches!(err, Error::Transport(msg) if msg.contains("400")));
}

#[tokio::test]
async fn test_delete_missing_is_transport_error() {
    let (server, client) = server().await;
    let id = server.seed_discipline(dto("DISC01", "Civil")).await;

    client.delete_discipline(&id).await.unwrap();
    assert!(client.get_discipline(&id).await.unwrap().is_none());

    let err = client.delete_discipline(&id).await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
}

#[tokio::test]
async fn test_projects_require_a_valid_token() {
    let (server, client) = server().await;
    server.seed_project("p-1", "Tower A").await;

    let token = client.fetch_token().await.unwrap();
    let projects = client.list_projects(&token).await.unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0].name, "Tower A");

    let err = client.list_projects("forged").await.unwrap_err();
    assert!(matches!(err, Error::Transport(msg) if msg.contains("401")));
}

#[tokio::test]
async fn test_wrong_password_is_auth_error() {
    let server = MockServer::start(MockCredentials::default()).await.unwrap();
    let mut config = server.config();
    config.password = "wrong".into();
    let client = RestClient::new(config).unwrap();

    let err = client.fetch_token().await.unwrap_err();
    assert!(matches!(err, Error::Auth(_)));
}

#[tokio::test]
async fn test_id_cannot_escape_its_path_segment() {
    let (server, client) = server().await;
    server
        .seed_discipline(DisciplineDto {
            id: Some("y".into()),
            ..dto("DISC01", "Civil")
        })
        .await;

    let err = client.delete_discipline("x/../y").await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
    assert!(client.get_discipline("y").await.unwrap().is_some());
}
