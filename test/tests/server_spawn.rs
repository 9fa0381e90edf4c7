/// Server entity spawning: activation rules for scene objects and prefab
/// instances, the errors raised for invalid spawns, and which connections
/// receive spawn and destroy traffic.

use helm_server::{EntityOwner, Server, ServerConfig, ServerError};
use helm_shared::{
    AssetId, ErrorKind, ObjectDestroyMessage, SceneId, SpawnMessage, TypedMessage, WorldRefType,
};
use helm_test::{protocol, RemotePeer, TestEntity, TestWorld};

fn listening_server() -> Server<TestEntity> {
    let mut server = Server::new(ServerConfig::default(), protocol());
    server.listen();
    server
}

#[test]
fn spawn_objects_on_inactive_server_returns_false() {
    let mut server: Server<TestEntity> = Server::new(ServerConfig::default(), protocol());
    let mut world = TestWorld::new();
    let scene_object = world.spawn_scene_object(5, false);

    assert!(!server.spawn_objects(&mut world));
    assert!(!world.is_active(&scene_object));
    assert!(!server.is_spawned(&scene_object));
}

#[test]
fn spawn_objects_activates_scene_objects_only() {
    let mut server = listening_server();
    let mut world = TestWorld::new();
    let scene_object = world.spawn_scene_object(5, false);
    let prefab_instance = world.spawn_prefab(AssetId::new(1), false);

    assert!(server.spawn_objects(&mut world));

    assert!(world.is_active(&scene_object));
    assert!(server.is_spawned(&scene_object));
    assert!(!world.is_active(&prefab_instance));
    assert!(!server.is_spawned(&prefab_instance));
}

#[test]
fn spawn_objects_skips_already_spawned() {
    let mut server = listening_server();
    let mut world = TestWorld::new();
    let scene_object = world.spawn_scene_object(5, false);

    assert!(server.spawn_objects(&mut world));
    let entity_id = server.entity_id(&scene_object);
    assert!(server.spawn_objects(&mut world));

    assert_eq!(server.entity_id(&scene_object), entity_id);
    assert_eq!(server.authority_table().entities().len(), 1);
}

#[test]
fn spawn_object_while_inactive_fails() {
    let mut server: Server<TestEntity> = Server::new(ServerConfig::default(), protocol());
    let mut world = TestWorld::new();
    let entity = world.spawn_prefab(AssetId::new(1), true);

    let result = server.spawn_object(&mut world, &entity, None);

    match result {
        Err(error @ ServerError::SpawnWhileInactive { .. }) => {
            assert_eq!(error.kind(), ErrorKind::InvalidOperation);
            assert_eq!(
                error.to_string(),
                format!(
                    "SpawnObject for {:?}, server is not active. Cannot spawn objects without an active server.",
                    entity
                )
            );
        }
        other => panic!("Expected SpawnWhileInactive error, got {:?}", other),
    }
    assert!(!server.is_spawned(&entity));
}

#[test]
fn spawn_object_with_owner_while_inactive_fails() {
    let mut other_server = listening_server();
    let (foreign_key, _peer) = RemotePeer::connect(&mut other_server);
    let mut server: Server<TestEntity> = Server::new(ServerConfig::default(), protocol());
    let mut world = TestWorld::new();
    let entity = world.spawn_prefab(AssetId::new(1), true);
    let player = world.spawn_prefab(AssetId::new(2), true);

    let result = server.spawn_object(&mut world, &entity, Some(foreign_key));

    match result {
        Err(error @ ServerError::SpawnWhileInactive { .. }) => {
            assert_eq!(error.kind(), ErrorKind::InvalidOperation);
        }
        other => panic!("Expected SpawnWhileInactive error, got {:?}", other),
    }
    assert!(matches!(
        server.spawn_with_player(&mut world, &entity, &player),
        Err(ServerError::SpawnWhileInactive { .. })
    ));
    assert!(!server.is_spawned(&entity));
}

#[test]
fn spawn_object_without_identity_fails() {
    let mut server = listening_server();
    let mut world = TestWorld::new();
    let entity = world.spawn_plain();

    let result = server.spawn_object(&mut world, &entity, None);

    match result {
        Err(error @ ServerError::NoIdentity { .. }) => {
            assert_eq!(error.kind(), ErrorKind::InvalidOperation);
        }
        other => panic!("Expected NoIdentity error, got {:?}", other),
    }
}

#[test]
fn spawn_object_twice_fails() {
    let mut server = listening_server();
    let mut world = TestWorld::new();
    let entity = world.spawn_prefab(AssetId::new(1), true);

    server
        .spawn_object(&mut world, &entity, None)
        .expect("first spawn should succeed");
    let result = server.spawn_object(&mut world, &entity, None);

    assert!(matches!(
        result,
        Err(ServerError::EntityAlreadySpawned { .. })
    ));
}

#[test]
fn spawn_object_for_unknown_owner_fails() {
    let mut server = listening_server();
    let mut world = TestWorld::new();
    let entity = world.spawn_prefab(AssetId::new(1), true);
    let (connection_key, _peer) = RemotePeer::connect(&mut server);
    server.disconnect(&connection_key);

    let result = server.spawn_object(&mut world, &entity, Some(connection_key));

    assert!(matches!(
        result,
        Err(ServerError::ConnectionNotFound { .. })
    ));
    assert!(!server.is_spawned(&entity));
}

#[test]
fn spawn_object_with_owner() {
    let mut server = listening_server();
    let mut world = TestWorld::new();
    let entity = world.spawn_prefab(AssetId::new(1), true);
    let (connection_key, _peer) = RemotePeer::connect(&mut server);

    server
        .spawn_object(&mut world, &entity, Some(connection_key))
        .expect("spawn should succeed");

    assert_eq!(
        server.entity_owner(&entity),
        Some(EntityOwner::Client(connection_key))
    );
    // ownership alone does not make it the player
    assert_eq!(server.controlled_entity(&connection_key), None);
    assert_eq!(server.num_players(), 0);
}

#[test]
fn spawn_reaches_ready_connections_only() {
    let mut server = listening_server();
    let mut world = TestWorld::new();
    let (ready_key, mut ready_peer) = RemotePeer::connect(&mut server);
    let (_, mut waiting_peer) = RemotePeer::connect(&mut server);
    server
        .set_client_ready(&world, &ready_key)
        .expect("connection should exist");

    let entity = world.spawn_prefab(AssetId::new(4), true);
    world.set_state(&entity, &[7, 7]);
    let entity_id = server
        .spawn_object(&mut world, &entity, Some(ready_key))
        .expect("spawn should succeed");

    let spawns = ready_peer.received::<SpawnMessage>();
    assert_eq!(
        spawns,
        vec![SpawnMessage {
            entity: entity_id,
            scene_id: SceneId::PREFAB,
            asset_id: Some(AssetId::new(4)),
            is_owner: true,
            is_local_player: false,
            payload: vec![7, 7],
        }]
    );
    assert!(waiting_peer.drain().is_empty());
}

#[test]
fn ready_connection_receives_existing_entities() {
    let mut server = listening_server();
    let mut world = TestWorld::new();
    let (connection_key, mut peer) = RemotePeer::connect(&mut server);
    let first = world.spawn_scene_object(1, false);
    let second = world.spawn_scene_object(2, false);
    server.spawn_objects(&mut world);
    assert!(peer.drain().is_empty());

    server
        .set_client_ready(&world, &connection_key)
        .expect("connection should exist");

    let spawned: Vec<_> = peer
        .received::<SpawnMessage>()
        .iter()
        .map(|spawn| spawn.entity)
        .collect();
    let mut expected = vec![
        server.entity_id(&first).expect("first should be spawned"),
        server.entity_id(&second).expect("second should be spawned"),
    ];
    expected.sort();
    assert_eq!(spawned, expected);

    // marking ready again does not spawn twice
    server
        .set_client_ready(&world, &connection_key)
        .expect("connection should exist");
    assert!(peer.drain().is_empty());
}

#[test]
fn local_connection_starts_ready() {
    let mut server = listening_server();
    let mut world = TestWorld::new();
    let entity = world.spawn_scene_object(3, false);
    server.spawn_objects(&mut world);

    let (connection_key, mut peer) = RemotePeer::connect_local(&mut server, &world);

    assert!(server.is_ready(&connection_key));
    assert!(server.local_client_active());
    assert_eq!(server.local_connection(), Some(connection_key));
    assert_eq!(
        peer.drain_names(),
        vec![SpawnMessage::KIND.name()]
    );
    assert!(server.observers(&entity).contains(&connection_key));
}

#[test]
fn local_connection_ready_is_configurable() {
    let config = ServerConfig {
        local_connection_ready: false,
        ..Default::default()
    };
    let mut server: Server<TestEntity> = Server::new(config, protocol());
    server.listen();
    let world = TestWorld::new();

    let (connection_key, _peer) = RemotePeer::connect_local(&mut server, &world);

    assert!(!server.is_ready(&connection_key));
}

#[test]
fn despawn_notifies_ready_observers() {
    let mut server = listening_server();
    let mut world = TestWorld::new();
    let (connection_key, mut peer) = RemotePeer::connect(&mut server);
    server
        .set_client_ready(&world, &connection_key)
        .expect("connection should exist");
    let entity = world.spawn_prefab(AssetId::new(1), true);
    let entity_id = server
        .spawn_object(&mut world, &entity, Some(connection_key))
        .expect("spawn should succeed");
    peer.drain();

    let despawned = server
        .despawn(&mut world, &entity)
        .expect("despawn should succeed");

    assert_eq!(despawned, entity_id);
    assert_eq!(
        peer.received::<ObjectDestroyMessage>(),
        vec![ObjectDestroyMessage { entity: entity_id }]
    );
    assert!(!world.has_entity(&entity));
    assert!(!server.is_spawned(&entity));
    assert!(server.authority_table().owned_by(&connection_key).is_empty());
}

#[test]
fn despawn_unspawned_entity_fails() {
    let mut server = listening_server();
    let mut world = TestWorld::new();
    let entity = world.spawn_prefab(AssetId::new(1), true);

    let result = server.despawn(&mut world, &entity);

    assert!(matches!(result, Err(ServerError::EntityNotSpawned { .. })));
    assert!(world.has_entity(&entity));
}

#[test]
fn cleanup_missing_forgets_removed_entities() {
    let mut server = listening_server();
    let mut world = TestWorld::new();
    let kept = world.spawn_scene_object(1, true);
    let removed = world.spawn_scene_object(2, true);
    server.spawn_objects(&mut world);
    let removed_id = server.entity_id(&removed).expect("should be spawned");

    world.remove(&removed);
    let cleaned = server.cleanup_missing(&world);

    assert_eq!(cleaned, vec![removed_id]);
    assert!(server.is_spawned(&kept));
    assert!(!server.is_spawned(&removed));
    assert!(!server.authority_table().contains(&removed_id));
}

#[test]
fn entity_ids_are_not_reused() {
    let mut server = listening_server();
    let mut world = TestWorld::new();
    let first = world.spawn_prefab(AssetId::new(1), true);
    let first_id = server
        .spawn_object(&mut world, &first, None)
        .expect("spawn should succeed");
    server
        .despawn(&mut world, &first)
        .expect("despawn should succeed");

    let second = world.spawn_prefab(AssetId::new(1), true);
    let second_id = server
        .spawn_object(&mut world, &second, None)
        .expect("spawn should succeed");

    assert_ne!(first_id, second_id);
    assert_eq!(server.world_entity(&second_id), Some(second));
    assert_eq!(server.world_entity(&first_id), None);
}
