pub(super) const ROOT_LONG_ABOUT: &str = "\
Build or update a patch repository

repo-update walks a repository tree, fills in the metadata every patch needs,
records a CRC-32 checksum for each payload file and, when given a separate
destination, mirrors the payload there ready for upload.

LAYOUT:

  <root>/repo.js
    Repository descriptor: id, title, contact address, the list of server
    URLs the repository is published under, and a map of patch id to title.
    Created if missing.

  <root>/<patch>/patch.js
    Patch descriptor. Any immediate subdirectory containing one is a patch;
    the directory name is the patch id. Its id and server URLs are rewritten
    on every run. Other keys (dependencies, fonts, ...) are left alone.

  <root>/<patch>/files.js
    Generated file index: patch-relative path to CRC-32. Rebuilt from
    scratch every run and written to both source and destination.

  Everything else under a patch directory is payload, except descriptor
  files and hidden (dot) files and directories.

PROMPTS:

  Required fields that are missing or blank (repository id, title, contact,
  first server URL, patch titles) are asked for on standard input until a
  non-blank answer is given. End of input while a field is still missing is
  an error.

TYPICAL WORKFLOW:

  1. Create patch directories, each with at least an empty patch.js:
     $ mkdir -p repo/th06 && echo '{}' > repo/th06/patch.js

  2. Update metadata and checksums in place:
     $ repo-update --from repo

  3. Publish to a separate directory that mirrors the payload:
     $ repo-update --from repo --to /srv/www/repo

LOGGING:

  Diagnostics go to standard error. Use -v for progress details, -vv for
  per-file checksums and copies, or set RUST_LOG for finer control.
";
