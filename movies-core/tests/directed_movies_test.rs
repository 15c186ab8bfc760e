use std::collections::HashSet;
use std::sync::Arc;

use movies_core::storage::InMemoryStorage;
use movies_core::{MovieError, MovieService, Related};

fn service() -> MovieService {
    MovieService::new(Arc::new(InMemoryStorage::new()))
}

#[tokio::test]
async fn test_kurosawa_directs_ran() {
    let service = service();

    let kurosawa = service.create_person("Akira Kurosawa").await.unwrap();
    let kurosawa_id = kurosawa.id().expect("id assigned on create");

    let ran = service.create_movie("Ran", Some(kurosawa_id)).await.unwrap();
    assert_eq!(ran.director_id(), Some(kurosawa_id));

    let reloaded = service.get_person_with_movies(kurosawa_id).await.unwrap();
    let directed = reloaded.directed_movies().as_loaded().expect("movies loaded");
    assert_eq!(directed.len(), 1);
    assert_eq!(directed[0].title(), "Ran");
    assert_eq!(directed[0].id(), ran.id());
}

#[tokio::test]
async fn test_ridley_scott_round_trip() {
    let service = service();

    let scott = service.create_person("Ridley Scott").await.unwrap();
    let id = scott.id().unwrap();

    let plain = service.get_person(id).await.unwrap();
    assert_eq!(plain.name(), "Ridley Scott");
    assert_eq!(plain.directed_movies(), &Related::NotLoaded);

    let loaded = service.get_person_with_movies(id).await.unwrap();
    assert_eq!(loaded.name(), "Ridley Scott");
    assert_eq!(loaded.directed_movies(), &Related::Loaded(Vec::new()));
}

#[tokio::test]
async fn test_person_ids_are_unique() {
    let service = service();
    let names = ["Akira Kurosawa", "Ridley Scott", "Agnès Varda", "Ridley Scott"];

    let mut ids = HashSet::new();
    for name in names {
        let person = service.create_person(name).await.unwrap();
        assert!(ids.insert(person.id().unwrap()));
    }

    let stored: HashSet<_> = service
        .list_people(None, None)
        .await
        .unwrap()
        .iter()
        .filter_map(|p| p.id())
        .collect();
    assert_eq!(stored, ids);
}

#[tokio::test]
async fn test_every_loaded_movie_points_back_at_its_director() {
    let service = service();
    let kurosawa = service.create_person("Akira Kurosawa").await.unwrap();
    let scott = service.create_person("Ridley Scott").await.unwrap();

    for title in ["Ran", "Seven Samurai", "Ikiru"] {
        service.create_movie(title, kurosawa.id()).await.unwrap();
    }
    service.create_movie("Alien", scott.id()).await.unwrap();

    for movie in service.list_movies(None, None).await.unwrap() {
        let director_id = movie.director_id().unwrap();
        let director = service.get_person_with_movies(director_id).await.unwrap();
        let directed = director.directed_movies().as_loaded().unwrap();
        assert!(directed.iter().any(|m| m.id() == movie.id()));
        assert!(directed.iter().all(|m| m.is_directed_by(director_id)));
    }
}

#[tokio::test]
async fn test_blank_names_never_reach_storage() {
    let service = service();

    assert!(matches!(
        service.create_person("   ").await,
        Err(MovieError::Validation(_))
    ));
    assert!(service.list_people(None, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_deleting_a_director_is_restricted() {
    let service = service();
    let kurosawa = service.create_person("Akira Kurosawa").await.unwrap();
    let id = kurosawa.id().unwrap();
    let ran = service.create_movie("Ran", Some(id)).await.unwrap();

    assert!(matches!(
        service.delete_person(id).await,
        Err(MovieError::Conflict(_))
    ));
    assert!(service.get_person(id).await.is_ok());

    service.delete_movie(ran.id().unwrap()).await.unwrap();
    service.delete_person(id).await.unwrap();
    assert!(matches!(
        service.get_person(id).await,
        Err(MovieError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_health_check_on_reachable_store() {
    assert!(service().check_health().await.is_ok());
}
