//! End-to-end generation against real files on disk.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::path::{Path, PathBuf};

use hookgen_core::output::MANIFEST_FILE;
use hookgen_core::{
    Error, GenerateError, Generator, OpenApiDocument, OutputLayout, TargetFramework,
    TargetProfile, generate,
};
use tempfile::TempDir;
use walkdir::WalkDir;

const PETSTORE: &str = r##"
openapi: 3.0.3
info:
  title: Petstore
  version: 1.0.0
paths:
  /pets:
    get:
      summary: List pets
      parameters:
        - name: limit
          in: query
          schema:
            type: integer
      responses:
        "200":
          description: A page of pets
          content:
            application/json:
              schema:
                type: array
                items:
                  $ref: "#/components/schemas/Pet"
    post:
      summary: Create a pet
      requestBody:
        required: true
        content:
          application/json:
            schema:
              $ref: "#/components/schemas/NewPet"
      responses:
        "201":
          description: Created
          content:
            application/json:
              schema:
                $ref: "#/components/schemas/Pet"
  /pets/{petId}:
    parameters:
      - name: petId
        in: path
        required: true
        schema:
          type: string
    get:
      responses:
        "200":
          description: One pet
          content:
            application/json:
              schema:
                $ref: "#/components/schemas/Pet"
    delete:
      deprecated: true
      responses:
        "204":
          description: Deleted
components:
  schemas:
    Pet:
      type: object
      required: [id, name]
      properties:
        id:
          type: string
        name:
          type: string
        status:
          $ref: "#/components/schemas/PetStatus"
    NewPet:
      type: object
      required: [name]
      properties:
        name:
          type: string
    PetStatus:
      type: string
      enum: [available, sold]
"##;

fn write_doc(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path
}

/// Generated files under `root`, manifest excluded, in path order.
fn read_tree(root: &Path) -> Vec<(PathBuf, String)> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .map(Result::unwrap)
        .filter(|entry| entry.file_type().is_file() && entry.file_name() != MANIFEST_FILE)
        .map(|entry| {
            let content = fs::read_to_string(entry.path()).unwrap();
            (entry.path().strip_prefix(root).unwrap().to_path_buf(), content)
        })
        .collect()
}

#[test]
fn test_petstore_react_output() {
    let tmp = TempDir::new().unwrap();
    let input = write_doc(tmp.path(), "openapi.yaml", PETSTORE);
    let out = tmp.path().join("src/api");

    let report = generate(&input, &out, &TargetProfile::default()).unwrap();
    assert_eq!(report.title, "Petstore");
    assert_eq!(report.routes, 4);
    assert_eq!(report.queries, 2);
    assert_eq!(report.mutations, 2);
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);

    let names: Vec<_> = read_tree(&out).into_iter().map(|(p, _)| p).collect();
    assert_eq!(
        names,
        vec![
            PathBuf::from("client.ts"),
            PathBuf::from("hooks/useDeletePetsPetId.ts"),
            PathBuf::from("hooks/useGetPets.ts"),
            PathBuf::from("hooks/useGetPetsPetId.ts"),
            PathBuf::from("hooks/usePostPets.ts"),
            PathBuf::from("index.ts"),
            PathBuf::from("types.ts"),
        ]
    );

    let types = fs::read_to_string(out.join("types.ts")).unwrap();
    assert!(types.contains("export const PetStatus = {"));
    assert!(types.contains("export type GetPetsResponse = Pet[];"));
    assert!(types.contains("export type DeletePetsPetIdResponse = void;"));

    let list = fs::read_to_string(out.join("hooks/useGetPets.ts")).unwrap();
    assert!(list.contains("return [\"/pets\", args] as const;"));
    assert!(list.contains("client.pets.$get(args, { ...clientOptions, signal })"));

    let delete = fs::read_to_string(out.join("hooks/useDeletePetsPetId.ts")).unwrap();
    assert!(delete.contains("@deprecated"));
    assert!(delete.contains("client.pets[\":petId\"].$delete(args, clientOptions)"));

    let client = fs::read_to_string(out.join("client.ts")).unwrap();
    assert!(client.contains("$delete: (args: DeletePetsPetIdArgs, options?: ClientRequestOptions) => Promise<DeletePetsPetIdResponse>;"));
}

#[test]
fn test_vue_single_file_output() {
    let tmp = TempDir::new().unwrap();
    let input = write_doc(tmp.path(), "openapi.yaml", PETSTORE);
    let out = tmp.path().join("api");
    let mut profile = TargetProfile::new(TargetFramework::Vue);
    profile.layout = OutputLayout::SingleFile;

    generate(&input, &out, &profile).unwrap();
    let names: Vec<_> = read_tree(&out).into_iter().map(|(p, _)| p).collect();
    assert_eq!(
        names,
        vec![
            PathBuf::from("client.ts"),
            PathBuf::from("hooks.ts"),
            PathBuf::from("index.ts"),
            PathBuf::from("types.ts"),
        ]
    );
    let hooks = fs::read_to_string(out.join("hooks.ts")).unwrap();
    assert!(hooks.contains("from \"@tanstack/vue-query\";"));
    assert!(hooks.contains("import { client } from \"../api-client\";"));
    assert!(!hooks.contains("signal"));
}

#[test]
fn test_output_is_byte_identical_across_runs() {
    let tmp = TempDir::new().unwrap();
    let input = write_doc(tmp.path(), "openapi.yaml", PETSTORE);
    let first = tmp.path().join("first");
    let second = tmp.path().join("second");

    generate(&input, &first, &TargetProfile::default()).unwrap();
    generate(&input, &second, &TargetProfile::default()).unwrap();
    assert_eq!(read_tree(&first), read_tree(&second));

    // Regenerating over existing output is a no-op.
    generate(&input, &first, &TargetProfile::default()).unwrap();
    assert_eq!(read_tree(&first), read_tree(&second));
}

#[test]
fn test_json_and_yaml_inputs_agree() {
    let tmp = TempDir::new().unwrap();
    let json = r#"{
        "openapi": "3.1.0",
        "info": { "title": "T", "version": "1" },
        "paths": { "/health": { "get": { "responses": { "200": {
            "description": "ok",
            "content": { "application/json": { "schema": { "type": "string" } } }
        } } } } }
    }"#;
    let yaml = r#"
openapi: 3.1.0
info: { title: T, version: "1" }
paths:
  /health:
    get:
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema: { type: string }
"#;
    let from_json = tmp.path().join("json");
    let from_yaml = tmp.path().join("yaml");
    generate(
        &write_doc(tmp.path(), "a.json", json),
        &from_json,
        &TargetProfile::default(),
    )
    .unwrap();
    generate(
        &write_doc(tmp.path(), "b.yaml", yaml),
        &from_yaml,
        &TargetProfile::default(),
    )
    .unwrap();
    assert_eq!(read_tree(&from_json), read_tree(&from_yaml));
}

#[test]
fn test_failed_run_leaves_previous_output_untouched() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("api");
    fs::create_dir_all(out.join("hooks")).unwrap();
    fs::write(out.join("hooks/useKeep.ts"), "keep me").unwrap();

    let input = write_doc(
        tmp.path(),
        "openapi.yaml",
        r#"
openapi: 3.1.0
paths:
  /user-list:
    get: {}
  /user_list:
    get: {}
"#,
    );
    let err = generate(&input, &out, &TargetProfile::default()).unwrap_err();
    assert!(matches!(err, Error::Collision(_)));
    assert_eq!(read_tree(&out), vec![(PathBuf::from("hooks/useKeep.ts"), "keep me".into())]);
}

#[test]
fn test_collision_error_names_both_routes() {
    let doc = OpenApiDocument::from_json(
        r#"{ "openapi": "3.1.0", "paths": {
            "/user-list": { "get": {} },
            "/user_list": { "get": {} }
        } }"#,
    )
    .unwrap();
    let err = Generator::default().plan(&doc).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("GetUserList"), "{message}");
    assert!(message.contains("route GET /user-list"), "{message}");
    assert!(message.contains("route GET /user_list"), "{message}");
}

#[test]
fn test_same_path_different_methods_do_not_collide() {
    let doc = OpenApiDocument::from_json(
        r#"{ "openapi": "3.1.0", "paths": { "/{path}": {
            "parameters": [{ "name": "path", "in": "path", "required": true }],
            "get": {},
            "put": {}
        } } }"#,
    )
    .unwrap();
    let generation = Generator::default().plan(&doc).unwrap();
    assert!(generation.plan.get("hooks/useGetPath.ts").is_some());
    assert!(generation.plan.get("hooks/usePutPath.ts").is_some());
    let client = generation.plan.get("client.ts").unwrap();
    assert!(client.contains("  \":path\": {\n    $get: (args: GetPathArgs, "));
    assert!(client.contains("    $put: (args: PutPathArgs, "));
}

#[test]
fn test_output_path_that_is_a_file_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let input = write_doc(tmp.path(), "openapi.yaml", PETSTORE);
    let out = write_doc(tmp.path(), "api", "occupied");
    let err = generate(&input, &out, &TargetProfile::default()).unwrap_err();
    assert!(matches!(err, Error::Generate(GenerateError::InvalidOutputDir(_))));
    assert_eq!(fs::read_to_string(&out).unwrap(), "occupied");
}

#[test]
fn test_foreign_files_in_output_are_never_deleted() {
    let tmp = TempDir::new().unwrap();
    let input = write_doc(tmp.path(), "openapi.yaml", PETSTORE);
    let src = tmp.path().join("src");
    fs::create_dir_all(&src).unwrap();
    fs::write(src.join("main.tsx"), "createRoot(root).render(<App />);\n").unwrap();

    let err = generate(&input, &src, &TargetProfile::default()).unwrap_err();
    assert!(matches!(err, Error::Generate(GenerateError::UnmanagedFile { .. })));
    assert!(err.to_string().contains("main.tsx"), "{err}");
    assert_eq!(
        read_tree(&src),
        vec![(
            PathBuf::from("main.tsx"),
            "createRoot(root).render(<App />);\n".into()
        )]
    );
}

#[test]
fn test_manifest_lists_generated_files() {
    let tmp = TempDir::new().unwrap();
    let input = write_doc(tmp.path(), "openapi.yaml", PETSTORE);
    let out = tmp.path().join("api");
    generate(&input, &out, &TargetProfile::default()).unwrap();

    let manifest = fs::read_to_string(out.join(MANIFEST_FILE)).unwrap();
    let listed: Vec<_> = manifest.lines().filter(|l| !l.starts_with('#')).collect();
    assert_eq!(
        listed,
        vec![
            "client.ts",
            "hooks/useDeletePetsPetId.ts",
            "hooks/useGetPets.ts",
            "hooks/useGetPetsPetId.ts",
            "hooks/usePostPets.ts",
            "index.ts",
            "types.ts",
        ]
    );
}
