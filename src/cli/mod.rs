// cli module — small pieces shared by the six conversion binaries in src/bin/.
//
// raxoft/pzxtools has no shared CLI layer in the original source; each tool's
// `main` repeats the same "positional input, -o output, -h" option loop
// (tap2pzx.cpp, csw2pzx.cpp, tzx2pzx.cpp, txt2pzx.cpp, pzx2txt.cpp,
// pzx2wav.cpp all open-code it). We factor the repeated part — opening the
// input/output files, falling back to stdin/stdout — into one place and let
// each binary keep its own option loop, since the extra flags differ per tool.

pub mod io;
